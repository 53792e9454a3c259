//! Little-endian conversion utilities for reading numeric fields from byte slices.
//! Used by the compound-file sniffer to decode header and directory fields.

/// Converts a byte slice into an iterator of 32-bit unsigned integers.
/// Processes bytes in 4-byte chunks using little-endian byte order; a trailing
/// partial chunk is ignored.
pub(crate) fn to_u32_iter(bytes: &[u8]) -> impl ExactSizeIterator<Item = u32> + '_ {
    bytes.chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
}

/// Converts a byte slice into an iterator of usize values.
pub(crate) fn to_usize_iter(bytes: &[u8]) -> impl ExactSizeIterator<Item = usize> + '_ {
    to_u32_iter(bytes).map(|value| value as usize)
}

/// Reads a little-endian 64-bit unsigned integer at `offset`, if the slice is long enough.
#[inline]
pub(crate) fn to_u64(s: &[u8], offset: usize) -> Option<u64> {
    let bytes = s.get(offset..offset + 8)?;
    Some(u64::from_le_bytes(bytes.try_into().ok()?))
}

/// Reads a little-endian 32-bit unsigned integer at `offset`, if the slice is long enough.
#[inline]
pub(crate) fn to_u32(s: &[u8], offset: usize) -> Option<u32> {
    let bytes = s.get(offset..offset + 4)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

/// Reads a little-endian 16-bit unsigned integer at `offset`, if the slice is long enough.
#[inline]
pub(crate) fn to_u16(s: &[u8], offset: usize) -> Option<u16> {
    let bytes = s.get(offset..offset + 2)?;
    Some(u16::from_le_bytes(bytes.try_into().ok()?))
}

/// Reads a 32-bit little-endian value at `offset` as usize.
#[inline]
pub(crate) fn to_usize(s: &[u8], offset: usize) -> Option<usize> {
    to_u32(s, offset).map(|value| value as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_reads() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(to_u16(&bytes, 0), Some(0x0201));
        assert_eq!(to_u32(&bytes, 4), Some(0x0807_0605));
        assert_eq!(to_u64(&bytes, 0), Some(0x0807_0605_0403_0201));
        assert_eq!(to_usize(&bytes, 0), Some(0x0403_0201));
    }

    #[test]
    fn test_out_of_bounds_reads_are_none() {
        let bytes = [0u8; 6];
        assert_eq!(to_u32(&bytes, 4), None);
        assert_eq!(to_u64(&bytes, 0), None);
        assert_eq!(to_u16(&bytes, 6), None);
    }

    #[test]
    fn test_iter_ignores_partial_chunk() {
        let bytes = [1, 0, 0, 0, 2, 0, 0, 0, 3];
        assert_eq!(to_usize_iter(&bytes).collect::<Vec<_>>(), vec![1, 2]);
    }
}
