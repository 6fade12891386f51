// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::results::Segmentation;
use crate::{ExecutionContext, PlateauError, Sequence};

/// Offline detector contract: full series in, full segmentation out.
pub trait OfflineDetector {
    fn detect(
        &self,
        x: &Sequence<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<Segmentation, PlateauError>;
}
