//! HID report segmentation
//!
//! The channel carries fixed-size segments. An encoded frame is split
//! into 64-byte pieces, each prefixed with a one-byte report id (always
//! zero) and zero-padded at the tail. Responses always fit a single
//! segment, so no reassembly is needed on the receive side.

use tracing::trace;

/// Payload bytes per transport segment
pub const REPORT_DATA_SIZE: usize = 64;

/// Total segment size: report id byte plus payload
pub const REPORT_SIZE: usize = REPORT_DATA_SIZE + 1;

/// Split an encoded frame into transport segments
///
/// # Examples
///
/// ```
/// use magprobe_transport::{into_reports, REPORT_SIZE};
///
/// let reports = into_reports(&[0xAA; 70]);
/// assert_eq!(reports.len(), 2);
/// assert_eq!(reports[0].len(), REPORT_SIZE);
/// assert_eq!(reports[0][0], 0x00);
/// ```
pub fn into_reports(frame: &[u8]) -> Vec<[u8; REPORT_SIZE]> {
    debug_assert!(
        frame.len() <= magprobe_core::MAX_ENCODED_FRAME,
        "frame exceeds transport maximum"
    );

    let mut reports = Vec::with_capacity(frame.len().div_ceil(REPORT_DATA_SIZE).max(1));

    for chunk in frame.chunks(REPORT_DATA_SIZE) {
        let mut report = [0u8; REPORT_SIZE];
        // report[0] stays 0: the report id; unused tail bytes stay 0 too
        report[1..1 + chunk.len()].copy_from_slice(chunk);
        reports.push(report);
    }

    // An empty frame still goes out as one zeroed report.
    if reports.is_empty() {
        reports.push([0u8; REPORT_SIZE]);
    }

    trace!(frame_len = frame.len(), reports = reports.len(), "Segmented frame");

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_report() {
        let frame = [0x10, 0x02, 0xD1, 0x00, 0x00, 0xAB, 0xCD, 0x10, 0x03];
        let reports = into_reports(&frame);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0][0], 0x00);
        assert_eq!(&reports[0][1..=frame.len()], &frame);
        // zero padding after the frame
        assert!(reports[0][frame.len() + 1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_exact_fit() {
        let frame = [0x55u8; REPORT_DATA_SIZE];
        let reports = into_reports(&frame);
        assert_eq!(reports.len(), 1);
        assert_eq!(&reports[0][1..], &frame);
    }

    #[test]
    fn test_multi_report_split() {
        let frame: Vec<u8> = (0..150u8).collect();
        let reports = into_reports(&frame);

        assert_eq!(reports.len(), 3);
        for report in &reports {
            assert_eq!(report.len(), REPORT_SIZE);
            assert_eq!(report[0], 0x00);
        }
        assert_eq!(&reports[0][1..], &frame[..64]);
        assert_eq!(&reports[1][1..], &frame[64..128]);
        assert_eq!(&reports[2][1..=22], &frame[128..]);
        assert!(reports[2][23..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reassembled_data_matches() {
        let frame: Vec<u8> = (0..200u8).collect();
        let reports = into_reports(&frame);

        let mut joined = Vec::new();
        for report in &reports {
            joined.extend_from_slice(&report[1..]);
        }
        assert_eq!(&joined[..frame.len()], frame.as_slice());
    }
}
