//! Property-based tests for the universal properties every buffer discipline
//! and composition law must satisfy, independent of any one input sequence.

use mailbox_rs::{spawn, Buffer};
use proptest::prelude::*;

// =============================================================================
// Property 1: Drain after seal
// =============================================================================

proptest! {
    /// A FIFO mailbox (unbounded or bounded) delivers exactly the values sent,
    /// in order, then `None`, once sealed.
    #[test]
    fn prop_drain_after_seal(values in prop::collection::vec(any::<i32>(), 0..50)) {
        let (output, input, _seal) = spawn(Buffer::unbounded());
        for &v in &values {
            prop_assert!(output.send(v));
        }
        drop(output);

        let mut received = Vec::new();
        while let Some(v) = input.recv() {
            received.push(v);
        }
        prop_assert_eq!(received, values);
    }
}

// =============================================================================
// Property 2: No phantom values
// =============================================================================

proptest! {
    /// Every value a bounded mailbox ever yields was one that was sent.
    #[test]
    fn prop_no_phantom_values(values in prop::collection::vec(any::<i32>(), 0..30)) {
        let (output, input, _seal) = spawn(Buffer::bounded(4));
        let sent: std::collections::HashSet<i32> = values.iter().copied().collect();

        let producer_values = values.clone();
        let producer = std::thread::spawn(move || {
            for v in producer_values {
                output.send(v);
            }
        });

        let mut received = Vec::new();
        while let Some(v) = input.recv() {
            received.push(v);
        }
        producer.join().unwrap();

        for v in &received {
            prop_assert!(sent.contains(v));
        }
    }
}

// =============================================================================
// Property 3: Seal is terminal
// =============================================================================

proptest! {
    #[test]
    fn prop_seal_is_terminal(values in prop::collection::vec(any::<i32>(), 1..20)) {
        let (output, _input, seal) = spawn(Buffer::unbounded());
        seal.seal();
        for v in values {
            prop_assert!(!output.send(v));
        }
    }
}

// =============================================================================
// Property 4: Latest liveness
// =============================================================================

proptest! {
    #[test]
    fn prop_latest_liveness(values in prop::collection::vec(any::<i32>(), 0..20)) {
        let (output, input, _seal) = spawn(Buffer::latest(0));
        let mut last = 0;
        for v in values {
            prop_assert!(output.send(v));
            last = v;
            prop_assert_eq!(input.recv(), Some(last));
            // Peeking again must not consume: the same value is observed twice.
            prop_assert_eq!(input.recv(), Some(last));
        }
    }
}

// =============================================================================
// Property 5: Newest loss bound
// =============================================================================

proptest! {
    #[test]
    fn prop_newest_loss_bound(values in prop::collection::vec(any::<i32>(), 0..50), n in 1usize..8) {
        let (output, input, _seal) = spawn(Buffer::newest(n));
        for &v in &values {
            prop_assert!(output.send(v));
        }
        drop(output);

        let mut received = Vec::new();
        while let Some(v) = input.recv() {
            received.push(v);
        }

        let expected_len = values.len().min(n);
        prop_assert_eq!(received.len(), expected_len);
        if !values.is_empty() {
            prop_assert_eq!(&received[..], &values[values.len() - expected_len..]);
        }
    }
}

// =============================================================================
// Property 6: Single rendezvous
// =============================================================================

#[test]
fn prop_single_rendezvous_blocks_second_send() {
    let (output, input, _seal) = spawn(Buffer::single());
    assert!(output.send(1));

    let blocked_output = output.clone();
    let sender = std::thread::spawn(move || {
        blocked_output.send(2);
    });

    std::thread::sleep(std::time::Duration::from_millis(20));
    assert!(!sender.is_finished());

    assert_eq!(input.recv(), Some(1));
    sender.join().unwrap();
    assert_eq!(input.recv(), Some(2));
}

// =============================================================================
// Property 7: Monoid law on Output
// =============================================================================

proptest! {
    #[test]
    fn prop_monoid_law_on_output(
        a_sealed in any::<bool>(),
        b_sealed in any::<bool>(),
        value in any::<i32>(),
    ) {
        let (a_out, a_in, a_seal) = spawn(Buffer::unbounded());
        let (b_out, b_in, b_seal) = spawn(Buffer::unbounded());
        if a_sealed {
            a_seal.seal();
        }
        if b_sealed {
            b_seal.seal();
        }

        let expected = !a_sealed || !b_sealed;
        let combined = a_out + b_out;
        prop_assert_eq!(combined.send(value), expected);

        drop(combined);
        drop(a_seal);
        drop(b_seal);
        drop(a_in);
        drop(b_in);
    }
}

// =============================================================================
// Property 8: Alternative law on Input
// =============================================================================

proptest! {
    #[test]
    fn prop_alternative_law_on_input(
        a_sealed in any::<bool>(),
        b_sealed in any::<bool>(),
    ) {
        let (a_out, a_in, a_seal) = spawn(Buffer::<i32>::unbounded());
        let (b_out, b_in, b_seal) = spawn(Buffer::<i32>::unbounded());
        if a_sealed {
            a_seal.seal();
        }
        if b_sealed {
            b_seal.seal();
        }

        let both_exhausted = a_sealed && b_sealed;
        let combined = a_in | b_in;
        if both_exhausted {
            prop_assert_eq!(combined.recv(), None);
        }

        drop(combined);
        drop(a_out);
        drop(b_out);
        drop(a_seal);
        drop(b_seal);
    }
}

// =============================================================================
// Property 9: Withdrawal liveness
// =============================================================================

#[test]
fn prop_withdrawal_liveness() {
    let (output, input, _seal) = spawn(Buffer::<i32>::unbounded());

    let receiver = std::thread::spawn(move || input.recv());

    std::thread::sleep(std::time::Duration::from_millis(10));
    drop(output);

    let result = receiver.join().unwrap();
    assert_eq!(result, None);
}

// =============================================================================
// Property 10: No deadlock in cycles
// =============================================================================

#[test]
fn prop_no_deadlock_in_bounded_cycle() {
    let (out_a, in_a, _seal_a) = spawn(Buffer::<i32>::bounded(2));
    let (out_b, in_b, _seal_b) = spawn(Buffer::<i32>::bounded(2));

    let forward = std::thread::spawn(move || {
        for i in 0..20 {
            if !out_a.send(i) {
                break;
            }
            if in_b.recv().is_none() {
                break;
            }
        }
    });

    let backward = std::thread::spawn(move || {
        for i in 0..20 {
            if in_a.recv().is_none() {
                break;
            }
            if !out_b.send(i) {
                break;
            }
        }
    });

    forward.join().unwrap();
    backward.join().unwrap();
}
