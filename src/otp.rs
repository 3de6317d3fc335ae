//! Single-slot OTP holder shared by every request.
//!
//! Only one code is pending at a time: arming replaces whatever was there,
//! and a successful verification empties the slot. Verification is not
//! scoped by caller, so the email bound at generation time is what a
//! successful verification registers.

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub const OTP_LENGTH: usize = 6;

/// Generate a random 6-digit numeric code (leading zeros allowed)
pub fn generate_code() -> String {
    let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{:0width$}", value, width = OTP_LENGTH)
}

#[derive(Debug, Clone)]
struct PendingOtp {
    email: String,
    code: String,
    issued_at: Instant,
}

#[derive(Debug)]
pub struct OtpSlot {
    pending: Mutex<Option<PendingOtp>>,
    ttl: Option<Duration>,
}

impl OtpSlot {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            pending: Mutex::new(None),
            ttl,
        }
    }

    fn is_live(&self, pending: &PendingOtp) -> bool {
        match self.ttl {
            Some(ttl) => pending.issued_at.elapsed() <= ttl,
            None => true,
        }
    }

    /// Arm the slot with (email, code). Returns true if a live code was replaced.
    pub async fn arm(&self, email: String, code: String) -> bool {
        let mut pending = self.pending.lock().await;
        let replaced = pending.as_ref().map_or(false, |p| self.is_live(p));

        *pending = Some(PendingOtp {
            email,
            code,
            issued_at: Instant::now(),
        });

        replaced
    }

    /// Consume the slot if `code` matches the armed one, yielding the bound email.
    /// A mismatch leaves the slot untouched.
    pub async fn consume(&self, code: &str) -> Option<String> {
        let mut pending = self.pending.lock().await;

        let (live, matches) = match pending.as_ref() {
            Some(p) => (self.is_live(p), p.code == code),
            None => return None,
        };

        if !live {
            *pending = None;
            return None;
        }
        if !matches {
            return None;
        }

        pending.take().map(|p| p.email)
    }

    pub async fn is_armed(&self) -> bool {
        let pending = self.pending.lock().await;
        pending.as_ref().map_or(false, |p| self.is_live(p))
    }
}

impl Default for OtpSlot {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        for _ in 0..200 {
            let code = generate_code();
            assert_eq!(code.len(), OTP_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[tokio::test]
    async fn test_consume_binds_generation_email() {
        let slot = OtpSlot::default();
        assert!(!slot.arm("a@x.com".into(), "123456".into()).await);

        assert_eq!(slot.consume("123456").await.as_deref(), Some("a@x.com"));
        assert!(!slot.is_armed().await);
        // Single use
        assert_eq!(slot.consume("123456").await, None);
    }

    #[tokio::test]
    async fn test_mismatch_keeps_slot_armed() {
        let slot = OtpSlot::default();
        slot.arm("a@x.com".into(), "123456".into()).await;

        assert_eq!(slot.consume("654321").await, None);
        assert!(slot.is_armed().await);
        assert_eq!(slot.consume("123456").await.as_deref(), Some("a@x.com"));
    }

    #[tokio::test]
    async fn test_rearm_invalidates_previous_code() {
        let slot = OtpSlot::default();
        slot.arm("a@x.com".into(), "111111".into()).await;
        assert!(slot.arm("b@y.com".into(), "222222".into()).await);

        assert_eq!(slot.consume("111111").await, None);
        assert_eq!(slot.consume("222222").await.as_deref(), Some("b@y.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_code_is_rejected() {
        let slot = OtpSlot::new(Some(Duration::from_secs(300)));
        slot.arm("a@x.com".into(), "123456".into()).await;

        tokio::time::advance(Duration::from_secs(301)).await;

        assert!(!slot.is_armed().await);
        assert_eq!(slot.consume("123456").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_within_ttl_is_accepted() {
        let slot = OtpSlot::new(Some(Duration::from_secs(300)));
        slot.arm("a@x.com".into(), "123456".into()).await;

        tokio::time::advance(Duration::from_secs(60)).await;

        assert_eq!(slot.consume("123456").await.as_deref(), Some("a@x.com"));
    }
}
