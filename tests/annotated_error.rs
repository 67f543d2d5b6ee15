//! End-to-end tests of the public API across real function-call frames.

use stackerr::{bail, format_err, is, unwrap_cause, Error, Result};

fn read_block() -> Result<Vec<u8>> {
    bail!("disk offline")
}

fn sync_index() -> Result<Vec<u8>> {
    read_block().map_err(|e| Error::wrap_prefix(e, "syncing index", 0))
}

fn flush_cache() -> Result<Vec<u8>> {
    sync_index().map_err(|e| Error::wrap_prefix(e, "flushing cache", 0))
}

#[test]
fn prefix_chain_accumulates_across_call_sites() {
    let err = flush_cache().unwrap_err();
    assert_eq!(err.to_string(), "flushing cache: syncing index: disk offline");
    assert!(err
        .error_stack()
        .starts_with("flushing cache: syncing index: disk offline\n"));
}

#[test]
fn rewrapping_preserves_the_original_capture() {
    let original = read_block().unwrap_err();
    let rewrapped = Error::wrap(original.clone(), 2);
    assert!(is(&original, &rewrapped));
    assert_eq!(original.addresses(), rewrapped.addresses());
    assert_eq!(
        original.stack_frames().as_ptr(),
        rewrapped.stack_frames().as_ptr()
    );
}

#[test]
fn frames_match_addresses_and_render_in_blocks() {
    let err = flush_cache().unwrap_err();
    let frames = err.stack_frames();
    assert_eq!(frames.len(), err.addresses().len());
    assert!(!frames.is_empty());

    // Every frame renders as a two-line block.
    let rendered = err.stack();
    assert_eq!(rendered.lines().count(), frames.len() * 2);
}

#[test]
fn unwrapping_reaches_the_shared_cause() {
    let err = flush_cache().unwrap_err();
    let cause = unwrap_cause(err.clone());
    assert_eq!(cause.to_string(), "disk offline");

    // Identity, not message equality: a fresh error with the same text
    // does not compare equal.
    let unrelated = Error::new("disk offline");
    assert!(!is(&err, &unrelated));
}

#[test]
fn format_err_captures_at_the_call_site() {
    let err = format_err!("failed at step {}", 3);
    assert_eq!(err.to_string(), "failed at step 3");
    assert!(!err.addresses().is_empty());
}

#[test]
fn depth_limit_applies_to_later_constructions_only() {
    let before = Error::new("first");

    stackerr::set_max_stack_depth(4);
    let after = Error::new("second");
    stackerr::set_max_stack_depth(stackerr::DEFAULT_MAX_STACK_DEPTH);

    assert!(after.addresses().len() <= 4);
    // Already-constructed errors keep their original capture.
    assert!(!before.addresses().is_empty());
    assert_eq!(before.stack_frames().len(), before.addresses().len());
}
