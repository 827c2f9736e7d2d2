use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static PROMPT_SEQ: AtomicU64 = AtomicU64::new(0);

fn base36(mut v: u64) -> String {
    if v == 0 {
        return "0".to_string();
    }
    let mut s = Vec::new();
    while v > 0 {
        s.push(ALPHABET[(v % 36) as usize]);
        v /= 36;
    }
    s.reverse();
    String::from_utf8_lossy(&s).into_owned()
}

/// Identifier for a notification prompt: `gh2ide-<millis>-<random>-<seq>`.
///
/// The per-process sequence keeps ids distinct even if the random source fails.
pub fn create_prompt_id() -> String {
    let millis = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut buf = [0u8; 8];
    let rand = match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(_) => std::process::id() as u64,
    };
    let seq = PROMPT_SEQ.fetch_add(1, Ordering::Relaxed);
    format!(
        "gh2ide-{}-{}-{}",
        base36(millis),
        base36(rand & 0xffff_ffff),
        seq
    )
}
