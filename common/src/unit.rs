//! Marker types.

/// Marker type describing a QR code scan.
#[derive(Clone, Copy, Debug)]
pub struct Scan;
