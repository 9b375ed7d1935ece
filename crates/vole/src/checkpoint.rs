// Checkpoint format
//
// Binary layout, all integers little-endian:
//   magic   b"VOLE"
//   version u32
//   count   u32                      number of parameters
//   then per parameter:
//     name_len u32, name bytes (utf-8)
//     ndim     u32, dims as u32 each
//     data_len u64, data as f32 le   (data_len is a byte count)

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use vole_core::{Error, Param, Result, StateDict};

const MAGIC: &[u8; 4] = b"VOLE";
const VERSION: u32 = 1;

/// Serialize a state dict to a writer.
pub fn write_state<W: Write>(mut w: W, state: &StateDict) -> Result<()> {
    w.write_all(MAGIC)?;
    w.write_all(&VERSION.to_le_bytes())?;
    w.write_all(&(state.len() as u32).to_le_bytes())?;
    for (name, param) in state {
        w.write_all(&(name.len() as u32).to_le_bytes())?;
        w.write_all(name.as_bytes())?;
        w.write_all(&(param.shape.len() as u32).to_le_bytes())?;
        for &d in &param.shape {
            w.write_all(&(d as u32).to_le_bytes())?;
        }
        w.write_all(&((param.data.len() * 4) as u64).to_le_bytes())?;
        for &v in &param.data {
            w.write_all(&v.to_le_bytes())?;
        }
    }
    Ok(())
}

/// Deserialize a state dict from a reader.
pub fn read_state<R: Read>(mut r: R) -> Result<StateDict> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(Error::msg("not a checkpoint file (bad magic)"));
    }
    let version = read_u32(&mut r)?;
    if version != VERSION {
        return Err(Error::msg(format!(
            "unsupported checkpoint version {}",
            version
        )));
    }

    let count = read_u32(&mut r)? as usize;
    let mut state = StateDict::with_capacity(count);
    for _ in 0..count {
        let name_len = read_u32(&mut r)? as usize;
        let mut name_bytes = vec![0u8; name_len];
        r.read_exact(&mut name_bytes)?;
        let name = String::from_utf8(name_bytes)
            .map_err(|_| Error::msg("checkpoint parameter name is not utf-8"))?;

        let ndim = read_u32(&mut r)? as usize;
        let mut shape = Vec::with_capacity(ndim);
        for _ in 0..ndim {
            shape.push(read_u32(&mut r)? as usize);
        }

        let data_len = read_u64(&mut r)? as usize;
        if data_len % 4 != 0 {
            return Err(Error::msg(format!(
                "checkpoint data for {:?} is not a whole number of f32s",
                name
            )));
        }
        let mut bytes = vec![0u8; data_len];
        r.read_exact(&mut bytes)?;
        let data = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        // Param::new re-checks shape against element count.
        state.push((name, Param::new(shape, data)?));
    }
    Ok(state)
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(u32::from_le_bytes(b))
}

fn read_u64<R: Read>(r: &mut R) -> io::Result<u64> {
    let mut b = [0u8; 8];
    r.read_exact(&mut b)?;
    Ok(u64::from_le_bytes(b))
}

/// Serialize a state dict to an in-memory buffer.
pub fn to_bytes(state: &StateDict) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_state(&mut buf, state)?;
    Ok(buf)
}

/// Deserialize a state dict from an in-memory buffer.
pub fn from_bytes(bytes: &[u8]) -> Result<StateDict> {
    read_state(bytes)
}

/// Write a state dict to a file.
pub fn save_state<P: AsRef<Path>>(path: P, state: &StateDict) -> Result<()> {
    let mut w = BufWriter::new(File::create(path)?);
    write_state(&mut w, state)?;
    w.flush()?;
    Ok(())
}

/// Read a state dict from a file.
pub fn load_state<P: AsRef<Path>>(path: P) -> Result<StateDict> {
    read_state(BufReader::new(File::open(path)?))
}
