/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    DisplaySet,
    super::{
        buffer::PgsBuffer,
        error::PgsResult,
        segment::WriteSegmentExt,
    },
};

/// Allows writing display sets to a destination.
pub trait WriteDisplaySetExt {
    /// Writes the PCS, the WDS, every PDS, every ODS (fragmenting as needed), and the END of a
    /// display set, in that order.
    fn write_display_set(&mut self, display_set: &DisplaySet) -> PgsResult<()>;
}

impl WriteDisplaySetExt for PgsBuffer<'_> {

    fn write_display_set(&mut self, display_set: &DisplaySet) -> PgsResult<()> {

        self.write_pcs(&display_set.pcs)?;
        self.write_wds(&display_set.wds)?;

        for pds in &display_set.palettes {
            self.write_pds(pds)?;
        }
        for ods in &display_set.objects {
            self.write_ods(ods)?;
        }

        self.write_es(&display_set.end)
    }
}
