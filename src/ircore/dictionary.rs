use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use byteorder::{BigEndian, ByteOrder};
use crate::ircore::utils::file_io::read_exact_at;
use crate::ircore::{IrError, Result};

/// Size of one dictionary record: 8-byte offset + 4-byte length, big-endian.
pub const DICT_ENTRY_SIZE: u64 = 12;

/// The on-disk hash table can hold this many terms.
pub const DEFAULT_TABLE_SIZE: u64 = 611953;

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

/// 64-bit FNV-1a over the UTF-8 bytes of the term.
pub fn term_hash(term: &str) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in term.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

pub fn home_slot(term: &str, table_size: u64) -> u64 {
    term_hash(term) % table_size
}

/// Location of a term's record in the data file. `size == 0` marks a free slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DictEntry {
    pub pos: i64,
    pub size: i32,
}

impl DictEntry {
    pub const EMPTY: DictEntry = DictEntry { pos: 0, size: 0 };

    pub fn new(pos: i64, size: i32) -> Self {
        DictEntry { pos, size }
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn to_bytes(&self) -> [u8; DICT_ENTRY_SIZE as usize] {
        let mut buf = [0u8; DICT_ENTRY_SIZE as usize];
        BigEndian::write_i64(&mut buf[..8], self.pos);
        BigEndian::write_i32(&mut buf[8..], self.size);
        buf
    }

    pub fn from_bytes(buf: &[u8; DICT_ENTRY_SIZE as usize]) -> Self {
        DictEntry {
            pos: BigEndian::read_i64(&buf[..8]),
            size: BigEndian::read_i32(&buf[8..]),
        }
    }
}

/// Read side of the dictionary file.
#[derive(Debug)]
pub struct Dictionary {
    file: File,
    table_size: u64,
}

impl Dictionary {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        if len == 0 || len % DICT_ENTRY_SIZE != 0 {
            return Err(IrError::CorruptIndex(format!(
                "dictionary {} has length {}, not a multiple of {}",
                path.display(), len, DICT_ENTRY_SIZE)));
        }
        Ok(Dictionary {
            file,
            table_size: len / DICT_ENTRY_SIZE,
        })
    }

    pub fn table_size(&self) -> u64 {
        self.table_size
    }

    pub fn read_entry(&self, slot: u64) -> Result<DictEntry> {
        let mut buf = [0u8; DICT_ENTRY_SIZE as usize];
        read_exact_at(&self.file, &mut buf, slot * DICT_ENTRY_SIZE)?;
        Ok(DictEntry::from_bytes(&buf))
    }
}

/// Write side of the dictionary file, used once by the index freeze.
pub struct DictionaryWriter {
    writer: BufWriter<File>,
    table_size: u64,
}

impl DictionaryWriter {
    /// Creates a zero-filled table, i.e. every slot empty.
    pub fn create(path: &Path, table_size: u64) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(table_size * DICT_ENTRY_SIZE)?;
        Ok(DictionaryWriter {
            writer: BufWriter::new(file),
            table_size,
        })
    }

    pub fn write_entry(&mut self, slot: u64, entry: &DictEntry) -> Result<()> {
        debug_assert!(slot < self.table_size);
        self.writer.seek(SeekFrom::Start(slot * DICT_ENTRY_SIZE))?;
        self.writer.write_all(&entry.to_bytes())?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_all()?;
        Ok(())
    }
}
