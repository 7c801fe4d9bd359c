//! Reader for the FITS subset used by TESS light-curve products
//!
//! A light-curve product is a primary HDU with no data followed by a
//! `BINTABLE` extension holding the photometry columns. The reader walks the
//! 2880-byte header/data blocks up to the first binary table and extracts
//! scalar floating-point columns by name; every other column type is sized
//! correctly and skipped.

use std::{
    fs::File,
    io::{BufReader, ErrorKind, Read},
    path::Path,
};

const BLOCK: usize = 2880;
const CARD: usize = 80;
const CARDS_PER_BLOCK: usize = BLOCK / CARD;

#[derive(thiserror::Error, Debug)]
pub enum FitsError {
    #[error("Failed to read the FITS file")]
    Io(#[from] std::io::Error),
    #[error("Not a FITS file")]
    NotFits,
    #[error("Truncated FITS block")]
    Truncated,
    #[error("Missing mandatory keyword {0}")]
    MissingKeyword(String),
    #[error("Invalid value for keyword {0}")]
    InvalidValue(String),
    #[error("No BINTABLE extension")]
    NoTable,
    #[error("No column named {0}")]
    NoColumn(String),
    #[error("Cannot decode column {0} with format {1}")]
    UnsupportedFormat(String, String),
    #[error("Unknown TFORM type code {0}")]
    UnknownForm(char),
}
type Result<T> = std::result::Result<T, FitsError>;

/// Header of one HDU, keyword cards in file order
struct Header {
    cards: Vec<(String, String)>,
}
impl Header {
    fn read<R: Read>(rdr: &mut R) -> Result<Self> {
        let mut cards = Vec::new();
        let mut block = [0u8; BLOCK];
        loop {
            rdr.read_exact(&mut block).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => FitsError::Truncated,
                _ => FitsError::Io(e),
            })?;
            for card in 0..CARDS_PER_BLOCK {
                let bytes = &block[card * CARD..(card + 1) * CARD];
                let keyword = String::from_utf8_lossy(&bytes[..8]).trim_end().to_string();
                match keyword.as_str() {
                    "END" => return Ok(Self { cards }),
                    "" | "COMMENT" | "HISTORY" => continue,
                    _ => (),
                }
                if &bytes[8..10] != b"= " {
                    continue;
                }
                let raw = String::from_utf8_lossy(&bytes[10..]);
                cards.push((keyword, Self::value(&raw)));
            }
        }
    }
    /// Strips the inline comment and the quotes of string values
    fn value(raw: &str) -> String {
        if let Some(open) = raw.find('\'') {
            match raw[open + 1..].find('\'') {
                Some(close) => raw[open + 1..open + 1 + close].trim_end().to_string(),
                None => raw[open + 1..].trim_end().to_string(),
            }
        } else {
            raw.split('/').next().unwrap_or("").trim().to_string()
        }
    }
    fn get(&self, key: &str) -> Option<&str> {
        self.cards
            .iter()
            .find(|(keyword, _)| keyword == key)
            .map(|(_, value)| value.as_str())
    }
    fn get_usize(&self, key: &str) -> Result<usize> {
        self.get(key)
            .ok_or_else(|| FitsError::MissingKeyword(key.to_string()))?
            .parse()
            .map_err(|_| FitsError::InvalidValue(key.to_string()))
    }
    fn get_usize_or(&self, key: &str, default: usize) -> Result<usize> {
        match self.get(key) {
            Some(value) => value
                .parse()
                .map_err(|_| FitsError::InvalidValue(key.to_string())),
            None => Ok(default),
        }
    }
    /// Byte length of the data unit that follows this header, padding excluded
    fn data_len(&self) -> Result<usize> {
        let naxis = self.get_usize("NAXIS")?;
        if naxis == 0 {
            return Ok(0);
        }
        // BITPIX is negative for IEEE float images
        let bitpix: i64 = self
            .get("BITPIX")
            .ok_or_else(|| FitsError::MissingKeyword("BITPIX".to_string()))?
            .parse()
            .map_err(|_| FitsError::InvalidValue("BITPIX".to_string()))?;
        let bitpix_bytes = bitpix.unsigned_abs() as usize / 8;
        let mut elements = 1usize;
        for i in 1..=naxis {
            elements *= self.get_usize(&format!("NAXIS{}", i))?;
        }
        let pcount = self.get_usize_or("PCOUNT", 0)?;
        let gcount = self.get_usize_or("GCOUNT", 1)?;
        Ok(bitpix_bytes * gcount * (pcount + elements))
    }
}

/// One field of a binary table
struct Column {
    name: String,
    offset: usize,
    repeat: usize,
    code: char,
}
impl Column {
    /// Field width in bytes
    fn width(&self) -> Result<usize> {
        Ok(match self.code {
            'L' | 'A' | 'B' => self.repeat,
            'X' => (self.repeat + 7) / 8,
            'I' => 2 * self.repeat,
            'J' | 'E' => 4 * self.repeat,
            'K' | 'D' | 'C' | 'P' => 8 * self.repeat,
            'M' | 'Q' => 16 * self.repeat,
            other => return Err(FitsError::UnknownForm(other)),
        })
    }
}

/// First binary table extension of a FITS file
pub struct BinTable {
    rows: usize,
    row_len: usize,
    columns: Vec<Column>,
    data: Vec<u8>,
}
impl BinTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }
    pub fn from_reader<R: Read>(mut rdr: R) -> Result<Self> {
        let primary = Header::read(&mut rdr)?;
        if primary.get("SIMPLE") != Some("T") {
            return Err(FitsError::NotFits);
        }
        skip_data(&mut rdr, primary.data_len()?)?;
        loop {
            let header = match Header::read(&mut rdr) {
                Ok(header) => header,
                // clean end of file before any binary table
                Err(FitsError::Truncated) => return Err(FitsError::NoTable),
                Err(e) => return Err(e),
            };
            if header.get("XTENSION") == Some("BINTABLE") {
                return Self::from_table_header(&mut rdr, &header);
            }
            skip_data(&mut rdr, header.data_len()?)?;
        }
    }
    fn from_table_header<R: Read>(rdr: &mut R, header: &Header) -> Result<Self> {
        let row_len = header.get_usize("NAXIS1")?;
        let rows = header.get_usize("NAXIS2")?;
        let tfields = header.get_usize("TFIELDS")?;
        let mut columns = Vec::with_capacity(tfields);
        let mut offset = 0;
        for i in 1..=tfields {
            let name = header
                .get(&format!("TTYPE{}", i))
                .ok_or_else(|| FitsError::MissingKeyword(format!("TTYPE{}", i)))?
                .to_string();
            let form = header
                .get(&format!("TFORM{}", i))
                .ok_or_else(|| FitsError::MissingKeyword(format!("TFORM{}", i)))?;
            let (repeat, code) = parse_tform(form, i)?;
            let column = Column {
                name,
                offset,
                repeat,
                code,
            };
            offset += column.width()?;
            columns.push(column);
        }
        if offset != row_len {
            return Err(FitsError::InvalidValue("NAXIS1".to_string()));
        }
        let mut data = vec![0u8; rows * row_len];
        rdr.read_exact(&mut data).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => FitsError::Truncated,
            _ => FitsError::Io(e),
        })?;
        Ok(Self {
            rows,
            row_len,
            columns,
            data,
        })
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    /// Extracts a scalar `E` or `D` column as `f64` values
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .columns
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| FitsError::NoColumn(name.to_string()))?;
        let format = format!("{}{}", column.repeat, column.code);
        if column.repeat != 1 {
            return Err(FitsError::UnsupportedFormat(name.to_string(), format));
        }
        let cell = |row: usize| {
            let start = row * self.row_len + column.offset;
            &self.data[start..]
        };
        match column.code {
            'E' => Ok((0..self.rows)
                .map(|row| {
                    let bytes: [u8; 4] = cell(row)[..4].try_into().unwrap();
                    f32::from_be_bytes(bytes) as f64
                })
                .collect()),
            'D' => Ok((0..self.rows)
                .map(|row| {
                    let bytes: [u8; 8] = cell(row)[..8].try_into().unwrap();
                    f64::from_be_bytes(bytes)
                })
                .collect()),
            _ => Err(FitsError::UnsupportedFormat(name.to_string(), format)),
        }
    }
}

/// Consume a data unit and its padding up to the next 2880-byte boundary
fn skip_data<R: Read>(rdr: &mut R, data_len: usize) -> Result<()> {
    if data_len == 0 {
        return Ok(());
    }
    let padded = (data_len + BLOCK - 1) / BLOCK * BLOCK;
    let copied = std::io::copy(&mut rdr.take(padded as u64), &mut std::io::sink())?;
    if copied as usize != padded {
        return Err(FitsError::Truncated);
    }
    Ok(())
}

/// Splits a TFORM value into its repeat count and type code
fn parse_tform(form: &str, field: usize) -> Result<(usize, char)> {
    let digits: String = form.chars().take_while(|c| c.is_ascii_digit()).collect();
    let repeat = if digits.is_empty() {
        1
    } else {
        digits
            .parse()
            .map_err(|_| FitsError::InvalidValue(format!("TFORM{}", field)))?
    };
    let code = form
        .chars()
        .nth(digits.len())
        .ok_or_else(|| FitsError::InvalidValue(format!("TFORM{}", field)))?;
    Ok((repeat, code))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn card(key: &str, value: &str) -> Vec<u8> {
        let mut text = format!("{:<8}= {}", key, value);
        text.truncate(CARD);
        format!("{:<80}", text).into_bytes()
    }

    fn header_block(cards: &[Vec<u8>]) -> Vec<u8> {
        let mut block: Vec<u8> = cards.concat();
        block.extend(format!("{:<80}", "END").into_bytes());
        block.resize(BLOCK, b' ');
        block
    }

    fn lightcurve_file(rows: &[(f64, f32)]) -> Vec<u8> {
        let mut file = header_block(&[
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
        ]);
        file.extend(header_block(&[
            card("XTENSION", "'BINTABLE'"),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", "12"),
            card("NAXIS2", &rows.len().to_string()),
            card("PCOUNT", "0"),
            card("GCOUNT", "1"),
            card("TFIELDS", "2"),
            card("TTYPE1", "'TIME    '"),
            card("TFORM1", "'D       '"),
            card("TTYPE2", "'PDCSAP_FLUX'"),
            card("TFORM2", "'E       '"),
        ]));
        let mut data = Vec::new();
        for (time, flux) in rows {
            data.extend(time.to_be_bytes());
            data.extend(flux.to_be_bytes());
        }
        data.resize((data.len() + BLOCK - 1) / BLOCK * BLOCK, 0);
        file.extend(data);
        file
    }

    #[test]
    fn reads_time_and_flux_columns() {
        let file = lightcurve_file(&[(1354.1, 98.5f32), (1354.2, 100.0), (1354.3, 101.5)]);
        let table = BinTable::from_reader(Cursor::new(file)).unwrap();
        assert_eq!(table.rows(), 3);
        assert_eq!(table.column("TIME").unwrap(), vec![1354.1, 1354.2, 1354.3]);
        let flux = table.column("PDCSAP_FLUX").unwrap();
        assert!((flux[1] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn nan_cells_survive_extraction() {
        let file = lightcurve_file(&[(1354.1, f32::NAN), (1354.2, 100.0)]);
        let table = BinTable::from_reader(Cursor::new(file)).unwrap();
        let flux = table.column("PDCSAP_FLUX").unwrap();
        assert!(flux[0].is_nan());
        assert_eq!(flux[1], 100.0);
    }

    #[test]
    fn unknown_column_is_reported() {
        let file = lightcurve_file(&[(1354.1, 100.0)]);
        let table = BinTable::from_reader(Cursor::new(file)).unwrap();
        assert!(matches!(
            table.column("SAP_FLUX"),
            Err(FitsError::NoColumn(_))
        ));
    }

    #[test]
    fn not_a_fits_file() {
        let block = header_block(&[card("SIMPLE", "F")]);
        assert!(matches!(
            BinTable::from_reader(Cursor::new(block)),
            Err(FitsError::NotFits)
        ));
    }

    #[test]
    fn missing_table_is_reported() {
        let block = header_block(&[
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "0"),
        ]);
        assert!(matches!(
            BinTable::from_reader(Cursor::new(block)),
            Err(FitsError::NoTable)
        ));
    }

    #[test]
    fn tform_repeat_counts() {
        assert_eq!(parse_tform("D", 1).unwrap(), (1, 'D'));
        assert_eq!(parse_tform("1E", 2).unwrap(), (1, 'E'));
        assert_eq!(parse_tform("16A", 3).unwrap(), (16, 'A'));
    }
}
