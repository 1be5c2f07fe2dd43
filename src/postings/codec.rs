use std::io::{self, Read, Write};

use crate::models::PostingEntry;

/// 8-byte big-endian doc number, 1-byte tf, 1-byte log2 length
pub const RECORD_SIZE: usize = 10;

pub fn encode_entry(entry: &PostingEntry) -> [u8; RECORD_SIZE] {
    let mut record = [0u8; RECORD_SIZE];
    record[..8].copy_from_slice(&entry.doc_number.to_be_bytes());
    record[8] = entry.term_frequency;
    record[9] = entry.doc_length_log2;
    record
}

fn decode_record(record: &[u8]) -> PostingEntry {
    let mut doc_number = [0u8; 8];
    doc_number.copy_from_slice(&record[..8]);
    PostingEntry::new(u64::from_be_bytes(doc_number), record[8], record[9])
}

/// Decode all complete records; a trailing partial record is ignored
pub fn decode_entries(data: &[u8]) -> Vec<PostingEntry> {
    data.chunks_exact(RECORD_SIZE).map(decode_record).collect()
}

/// Stream records from a reader, handing each to `visit`
pub fn read_entries<R: Read>(
    reader: &mut R,
    mut visit: impl FnMut(PostingEntry),
) -> io::Result<usize> {
    let mut record = [0u8; RECORD_SIZE];
    let mut count = 0;
    loop {
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match reader.read(&mut record[filled..]) {
                Ok(0) => return Ok(count),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        visit(decode_record(&record));
        count += 1;
    }
}

pub fn write_entries<'a, W, I>(writer: &mut W, entries: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a PostingEntry>,
{
    let mut count = 0;
    for entry in entries {
        writer.write_all(&encode_entry(entry))?;
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        let record = encode_entry(&PostingEntry::new(0x0102_0304_0506_0708, 3, 9));
        assert_eq!(record, [1, 2, 3, 4, 5, 6, 7, 8, 3, 9]);
    }

    #[test]
    fn test_stream_ignores_partial_tail() {
        let entries = vec![PostingEntry::new(1, 1, 2), PostingEntry::new(42, 5, 7)];
        let mut data = Vec::new();
        write_entries(&mut data, &entries).unwrap();
        data.extend_from_slice(&[0xFF; 4]);

        let mut decoded = Vec::new();
        let count = read_entries(&mut data.as_slice(), |e| decoded.push(e)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(decoded, entries);
        assert_eq!(decode_entries(&data), entries);
    }
}
