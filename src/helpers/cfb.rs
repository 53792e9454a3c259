//! OLE Compound File Binary (CFB) directory reader.
//! Office stores password-protected OOXML packages and legacy binary Word documents in
//! this container; only the directory is read here, to tell those cases apart.

use crate::error::RustyDocxError;
use crate::helpers::string::to_u16;
use crate::helpers::string::to_u64;
use crate::helpers::string::to_usize;
use crate::helpers::string::to_usize_iter;
use encoding_rs::UTF_16LE;
use std::collections::HashSet;
use thiserror::Error;

/// Largest regular sector number; everything above marks free/end-of-chain/FAT sectors.
const MAX_REG_SECT: usize = 0xFFFFFFFA;
/// CFB magic number (`D0 CF 11 E0 A1 B1 1A E1`).
const SIGNATURE: u64 = 0xE11A_B1A1_E011_CFD0;
/// Size of the fixed header and of one directory entry.
const HEADER_SIZE: usize = 512;
const DIRECTORY_ENTRY_SIZE: usize = 128;

/// Errors specific to Compound File Binary format parsing
#[derive(Error, Debug)]
pub(crate) enum CfbError {
    #[error("The file is corrupted or has an invalid CFB structure")]
    FileFormatError,

    #[error("Invalid OLE signature (not an office document?)")]
    OleSignatureError,

    #[error("Invalid Sector size '2 ^ {1}' for major version '{0}'")]
    SectorSizeError(u16, u16),

    #[error("The number of double indirect file allocation table error: expect '{0}', actual '{1}'")]
    DoubleIndirectFileAllocationTableError(usize, usize),

    #[error("Empty Root directory")]
    RootDirectoryError,
}

/// Directory listing of a compound file.
pub(crate) struct Cfb {
    /// Names of all storages and streams in the file
    names: HashSet<String>,
}

impl Cfb {
    /// Returns true when `bytes` start with the compound file signature.
    pub(crate) fn is_compound_file(bytes: &[u8]) -> bool {
        to_u64(bytes, 0) == Some(SIGNATURE)
    }

    /// Parses the header, allocation table and directory chain of an in-memory compound file.
    pub(crate) fn new(data: &[u8]) -> Result<Cfb, RustyDocxError> {
        if data.len() < HEADER_SIZE {
            Err(CfbError::FileFormatError)?;
        }
        let header = Header::new(&data[..HEADER_SIZE])?;
        let sectors = Sectors { data, size: header.sector_size()? };
        let file_allocation_table = Self::load_file_allocation_table(&sectors, &header)?;
        let names = Self::load_directories(&file_allocation_table, &sectors, header.directory_shift)?;
        Ok(Cfb { names })
    }

    /// Checks if a storage or stream exists in the CFB structure
    pub(crate) fn exists(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Loads the file allocation table using the double indirect file allocation table
    fn load_file_allocation_table(sectors: &Sectors, header: &Header) -> Result<Vec<usize>, RustyDocxError> {
        let mut double_indirect_file_allocation_table = Vec::<usize>::new();
        double_indirect_file_allocation_table.extend(to_usize_iter(sectors.slice(76, HEADER_SIZE)?));

        let mut count = 0usize;
        let mut index = header.double_indirect_file_allocation_table_shift;
        while index <= MAX_REG_SECT {
            if count >= sectors.count() {
                Err(CfbError::FileFormatError)?;
            }
            double_indirect_file_allocation_table.extend(to_usize_iter(sectors.get(index)?));
            index = double_indirect_file_allocation_table.pop().ok_or(CfbError::FileFormatError)?;
            count += 1;
        }
        if count != header.double_indirect_file_allocation_table_count {
            Err(CfbError::DoubleIndirectFileAllocationTableError(header.double_indirect_file_allocation_table_count, count))?
        }

        let mut file_allocation_table: Vec<usize> = Vec::new();
        for index in double_indirect_file_allocation_table {
            if index <= MAX_REG_SECT {
                file_allocation_table.extend(to_usize_iter(sectors.get(index)?));
            }
        }
        Ok(file_allocation_table)
    }

    /// Collects directory entry names by following the directory sector chain
    fn load_directories(file_allocation_table: &[usize], sectors: &Sectors, index: usize) -> Result<HashSet<String>, RustyDocxError> {
        let bytes = Self::read_bytes(file_allocation_table, sectors, index)?;
        let names: HashSet<String> = bytes
            .chunks_exact(DIRECTORY_ENTRY_SIZE)
            .filter_map(directory_name)
            .collect();
        if names.is_empty() {
            Err(CfbError::RootDirectoryError)?
        }
        Ok(names)
    }

    /// Reads the complete content of a chain by following the file allocation table
    fn read_bytes(file_allocation_table: &[usize], sectors: &Sectors, index: usize) -> Result<Vec<u8>, RustyDocxError> {
        let mut content: Vec<u8> = Vec::new();
        let mut index = index;
        let mut visited = 0usize;
        while index <= MAX_REG_SECT {
            visited += 1;
            if visited > sectors.count() {
                // Cyclic chain
                Err(CfbError::FileFormatError)?;
            }
            content.extend_from_slice(sectors.get(index)?);
            index = *file_allocation_table.get(index).ok_or(CfbError::FileFormatError)?;
        }
        Ok(content)
    }
}

/// Decodes the UTF-16 name of a used directory entry.
fn directory_name(bytes: &[u8]) -> Option<String> {
    // Object type 0 marks an unused entry
    if bytes.get(66).copied().unwrap_or(0) == 0 {
        return None;
    }
    let size = (to_u16(bytes, 64)? as usize).min(64);
    let (name, _, _) = UTF_16LE.decode(&bytes[..size]);
    let name = match name.find('\0') {
        Some(position) => &name[..position],
        None => name.as_ref(),
    };
    Some(name.to_owned())
}

/// View over all sectors in the CFB file
struct Sectors<'a> {
    data: &'a [u8],
    // Size of individual sectors
    size: usize,
}

impl<'a> Sectors<'a> {
    /// Gets the data for the sector at the specified index (sector 0 follows the header)
    fn get(&self, index: usize) -> Result<&'a [u8], CfbError> {
        let source = index.checked_add(1)
            .and_then(|position| position.checked_mul(self.size))
            .ok_or(CfbError::FileFormatError)?;
        if source >= self.data.len() {
            return Err(CfbError::FileFormatError);
        }
        let target = self.data.len().min(source + self.size);
        Ok(&self.data[source..target])
    }

    /// Gets a slice of raw data
    fn slice(&self, start: usize, end: usize) -> Result<&'a [u8], CfbError> {
        self.data.get(start..end).ok_or(CfbError::FileFormatError)
    }

    /// Number of sectors after the header
    fn count(&self) -> usize {
        self.data.len() / self.size
    }
}

/// CFB file header structure
#[derive(Debug)]
struct Header {
    major_version: u16,
    sector_shift: u16,
    directory_shift: usize,
    double_indirect_file_allocation_table_shift: usize,
    double_indirect_file_allocation_table_count: usize,
}

impl Header {
    /// Parses the CFB header from the first 512 bytes of data
    fn new(data: &[u8]) -> Result<Self, RustyDocxError> {
        if to_u64(data, 0) != Some(SIGNATURE) {
            Err(CfbError::OleSignatureError)?;
        }
        let field = |offset| to_usize(data, offset).ok_or(CfbError::FileFormatError);
        Ok(Header {
            major_version: to_u16(data, 26).ok_or(CfbError::FileFormatError)?,
            sector_shift: to_u16(data, 30).ok_or(CfbError::FileFormatError)?,
            directory_shift: field(48)?,
            double_indirect_file_allocation_table_shift: field(68)?,
            double_indirect_file_allocation_table_count: field(72)?,
        })
    }

    /// Calculates the sector size based on major version and sector shift
    fn sector_size(&self) -> Result<usize, RustyDocxError> {
        if self.major_version == 3 && self.sector_shift == 0x0009 {
            Ok(512) // 2 ^ 9
        } else if self.major_version == 4 && self.sector_shift == 0x000C {
            Ok(4096) // 2 ^ 12
        } else {
            Err(CfbError::SectorSizeError(self.major_version, self.sector_shift))?
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const END_OF_CHAIN: u32 = 0xFFFFFFFE;
    const FREE_SECT: u32 = 0xFFFFFFFF;
    const FAT_SECT: u32 = 0xFFFFFFFD;

    fn directory_entry(name: &str, object_type: u8) -> Vec<u8> {
        let mut entry = vec![0u8; DIRECTORY_ENTRY_SIZE];
        let encoded: Vec<u8> = name.encode_utf16()
            .chain(std::iter::once(0))
            .flat_map(|unit| unit.to_le_bytes())
            .collect();
        entry[..encoded.len()].copy_from_slice(&encoded);
        entry[64..66].copy_from_slice(&(encoded.len() as u16).to_le_bytes());
        entry[66] = object_type;
        entry
    }

    /// Builds a minimal version 3 compound file: sector 0 is the FAT, sector 1 the directory.
    pub(crate) fn compound_file(streams: &[&str]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data[0..8].copy_from_slice(&SIGNATURE.to_le_bytes());
        data[26..28].copy_from_slice(&3u16.to_le_bytes());
        data[30..32].copy_from_slice(&9u16.to_le_bytes());
        data[44..48].copy_from_slice(&1u32.to_le_bytes());
        data[48..52].copy_from_slice(&1u32.to_le_bytes());
        data[68..72].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
        for slot in data[76..HEADER_SIZE].chunks_exact_mut(4) {
            slot.copy_from_slice(&FREE_SECT.to_le_bytes());
        }
        data[76..80].copy_from_slice(&0u32.to_le_bytes());

        let mut fat = vec![0u8; 512];
        for slot in fat.chunks_exact_mut(4) {
            slot.copy_from_slice(&FREE_SECT.to_le_bytes());
        }
        fat[0..4].copy_from_slice(&FAT_SECT.to_le_bytes());
        fat[4..8].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
        data.extend(fat);

        let mut directory = directory_entry("Root Entry", 5);
        for stream in streams.iter().take(3) {
            directory.extend(directory_entry(stream, 2));
        }
        directory.resize(512, 0);
        data.extend(directory);
        data
    }

    #[test]
    fn test_lists_directory_names() {
        let data = compound_file(&["EncryptedPackage", "EncryptionInfo"]);
        assert!(Cfb::is_compound_file(&data));
        let cfb = Cfb::new(&data).unwrap();
        assert!(cfb.exists("Root Entry"));
        assert!(cfb.exists("EncryptedPackage"));
        assert!(!cfb.exists("WordDocument"));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let data = compound_file(&["WordDocument"]);
        assert!(Cfb::new(&data[..600]).is_err());
        assert!(Cfb::new(&data[..100]).is_err());
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut data = compound_file(&[]);
        data[0] = 0;
        assert!(!Cfb::is_compound_file(&data));
        assert!(Cfb::new(&data).is_err());
    }
}
