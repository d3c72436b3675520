use core::mem::ManuallyDrop;

use crate::chip_select::{ChipSelect, TransferType};

/// A selected chip that will be deselected when this wrapper goes
/// out-of-scope.
///
/// Created by [`ChipSelect::selection`](trait.ChipSelect.html#method.selection).
/// Dropping it deselects with the transfer type it was created with and throws
/// away any error, since `drop` can’t return one. Call
/// [`finish`](#method.finish) instead to find out whether deselecting worked.
pub struct Selection<'c, CS>
where
    CS: ChipSelect,
{
    cs: &'c mut CS,
    deselect_type: TransferType,
}

impl<'c, CS> Selection<'c, CS>
where
    CS: ChipSelect,
{
    pub(crate) fn new(cs: &'c mut CS, deselect_type: TransferType) -> Self {
        Selection { cs, deselect_type }
    }

    /// The transfer type the chip will be deselected with.
    pub fn deselect_type(&self) -> TransferType {
        self.deselect_type
    }

    /// Deselects now and reports the result.
    pub fn finish(self) -> Result<(), CS::Error> {
        // Skip our Drop so the chip is only deselected once.
        let mut this = ManuallyDrop::new(self);
        let deselect_type = this.deselect_type;
        this.cs.deselect(deselect_type)
    }
}

impl<'c, CS: ChipSelect> Drop for Selection<'c, CS> {
    fn drop(&mut self) {
        let _ = self.cs.deselect(self.deselect_type);
    }
}

impl<'c, CS: ChipSelect> core::ops::Deref for Selection<'c, CS> {
    type Target = CS;

    /// Make it convenient to get to the selected device.
    fn deref(&self) -> &Self::Target {
        &self.cs
    }
}

impl<'c, CS: ChipSelect> core::ops::DerefMut for Selection<'c, CS> {
    /// Make it convenient to get to the selected device.
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cs
    }
}
