use std::path::Path;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use serde::{Serialize, de::DeserializeOwned};
use crate::ircore::Result;

pub fn write_file<T: Serialize>(filepath: &Path, obj: &T) -> Result<()> {
    if let Some(dir) = filepath.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut writer = BufWriter::new(File::create(filepath)?);
    bincode::serialize_into(&mut writer, obj)?;
    writer.flush()?;
    Ok(())
}

pub fn read_file<T: DeserializeOwned>(filepath: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(filepath)?);
    let obj: T = bincode::deserialize_from(reader)?;
    Ok(obj)
}
