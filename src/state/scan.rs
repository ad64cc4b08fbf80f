/// Progress of the historical log scan for the current account.
///
/// `Complete` is only reached through an explicit completion message, so an
/// account holding zero tokens finishes loading like any other.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanProgress {
    #[default]
    Idle,
    Scanning {
        tip: u64,
        /// Lowest block covered so far. None until the first window lands.
        scanned_down_to: Option<u64>,
    },
    Complete {
        tip: u64,
    },
    Failed {
        reason: String,
    },
}

impl ScanProgress {
    pub fn start(&mut self, tip: u64) {
        *self = ScanProgress::Scanning {
            tip,
            scanned_down_to: None,
        };
    }

    /// Record a finished window. Ignored unless scanning.
    pub fn advance(&mut self, from_block: u64) {
        if let ScanProgress::Scanning {
            scanned_down_to, ..
        } = self
        {
            *scanned_down_to = Some(scanned_down_to.map_or(from_block, |b| b.min(from_block)));
        }
    }

    pub fn complete(&mut self) {
        if let ScanProgress::Scanning { tip, .. } = *self {
            *self = ScanProgress::Complete { tip };
        }
    }

    pub fn fail(&mut self, reason: String) {
        *self = ScanProgress::Failed { reason };
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ScanProgress::Complete { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ScanProgress::Scanning { .. })
    }

    /// Fraction of history covered, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        match self {
            ScanProgress::Idle | ScanProgress::Failed { .. } => 0.0,
            ScanProgress::Complete { .. } => 1.0,
            ScanProgress::Scanning {
                tip,
                scanned_down_to,
            } => match scanned_down_to {
                None => 0.0,
                Some(_) if *tip == 0 => 1.0,
                Some(low) => (*tip - (*low).min(*tip)) as f64 / *tip as f64,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut scan = ScanProgress::default();
        assert_eq!(scan, ScanProgress::Idle);

        scan.start(10_000);
        assert!(scan.is_running());
        assert_eq!(scan.fraction(), 0.0);

        scan.advance(5_001);
        assert_eq!(scan.fraction(), 0.4999);

        scan.advance(1);
        scan.advance(0);
        assert_eq!(scan.fraction(), 1.0);

        scan.complete();
        assert!(scan.is_complete());
        assert_eq!(scan, ScanProgress::Complete { tip: 10_000 });
    }

    #[test]
    fn test_complete_requires_scanning() {
        let mut scan = ScanProgress::default();
        scan.complete();
        assert_eq!(scan, ScanProgress::Idle);

        scan.fail("boom".to_string());
        scan.complete();
        assert!(!scan.is_complete());
    }

    #[test]
    fn test_advance_ignored_when_idle() {
        let mut scan = ScanProgress::default();
        scan.advance(100);
        assert_eq!(scan, ScanProgress::Idle);
    }
}
