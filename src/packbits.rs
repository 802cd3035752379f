//! PackBits run-length encoding for raster rows.
//!
//! Each raster row is compressed independently when compression is enabled;
//! the codec itself knows nothing about rows or planes.

/// Encode a byte slice with the PackBits scheme.
///
/// Runs of two or more identical bytes (up to 128) become the two-byte pair
/// `(256 - (run - 1), value)`; spans of non-repeating bytes (up to 128)
/// become `(len - 1)` followed by the bytes verbatim. A literal span ends as
/// soon as the next two bytes would start a run. Empty input encodes to
/// empty output.
pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut packed = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let mut run = 1;
        while i + run < data.len() && data[i + run] == data[i] && run < 128 {
            run += 1;
        }

        if run > 1 {
            packed.push((256 - (run as u16 - 1)) as u8);
            packed.push(data[i]);
            i += run;
        } else {
            let mut literal = 1;
            while i + literal < data.len() && literal < 128 {
                if i + literal + 1 < data.len() && data[i + literal] == data[i + literal + 1] {
                    break;
                }
                literal += 1;
            }

            packed.push(literal as u8 - 1);
            packed.extend_from_slice(&data[i..i + literal]);
            i += literal;
        }
    }

    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test oracle: reverse of `encode`. Not used on the wire; the printer
    /// does the decoding.
    fn decode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < data.len() {
            let n = data[i];
            if n < 128 {
                let len = n as usize + 1;
                out.extend_from_slice(&data[i + 1..i + 1 + len]);
                i += 1 + len;
            } else {
                let count = 257 - n as usize;
                out.extend(std::iter::repeat(data[i + 1]).take(count));
                i += 2;
            }
        }
        out
    }

    #[test]
    fn test_empty_input() {
        assert!(encode(&[]).is_empty());
    }

    #[test]
    fn test_run_collapses_to_two_bytes() {
        // Any run of 2..=128 identical bytes encodes as exactly two bytes.
        for len in [2usize, 3, 90, 128] {
            let data = vec![0xAA; len];
            let packed = encode(&data);
            assert_eq!(packed.len(), 2, "run of {}", len);
            assert_eq!(packed[0], (256 - (len as u16 - 1)) as u8);
            assert_eq!(packed[1], 0xAA);
        }
    }

    #[test]
    fn test_run_longer_than_cap_splits() {
        let data = vec![0x00; 130];
        let packed = encode(&data);
        // 128-byte run + 2-byte run
        assert_eq!(packed, vec![0x81, 0x00, 0xFF, 0x00]);
    }

    #[test]
    fn test_literal_span() {
        // Non-repeating span of n bytes costs n + 1 bytes.
        let data: Vec<u8> = (0..90).collect();
        let packed = encode(&data);
        assert_eq!(packed.len(), 91);
        assert_eq!(packed[0], 89);
        assert_eq!(&packed[1..], &data[..]);
    }

    #[test]
    fn test_literal_stops_before_run() {
        let data = [1, 2, 3, 7, 7, 7, 4, 5];
        let packed = encode(&data);
        assert_eq!(packed, vec![2, 1, 2, 3, 0xFE, 7, 1, 4, 5]);
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(encode(&[0x42]), vec![0, 0x42]);
    }

    #[test]
    fn test_round_trip() {
        let cases: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            vec![1, 1],
            vec![0xFF; 300],
            (0..=255).collect(),
            vec![0, 0, 1, 1, 2, 3, 4, 4, 4, 4, 0, 9],
            // Typical raster row: long white gaps around short black runs.
            {
                let mut row = vec![0u8; 90];
                for b in row.iter_mut().skip(30).take(20) {
                    *b = 0xFF;
                }
                row[55] = 0x0F;
                row
            },
        ];
        for data in cases {
            assert_eq!(decode(&encode(&data)), data, "input {:?}", data);
        }
    }
}
