//! Standalone expected-income extractor binary.
//!
//! Run as a subprocess to isolate PDF parsing crashes from a host
//! application: a malformed document takes down only this process.
//!
//! Usage: income_extractor <path_to_pdf> [--month <1-12> --year <yyyy>]
//! Output: JSON candidates on stdout (forecast records when a reference
//! period is given), errors on stderr
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments
//!   2 - PDF read error
//!   3 - Extraction error
//!   4 - PDF validation failed

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use income_pdf_import::forecast::to_forecast_records;
use income_pdf_import::parse_pdf;

/// PDF magic bytes
const PDF_MAGIC: &[u8] = b"%PDF";
/// Maximum PDF file size (100 MB)
const MAX_PDF_SIZE: usize = 100 * 1024 * 1024;

struct Args {
    pdf_path: String,
    period: Option<(u32, i32)>,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut pdf_path = None;
    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--month" => {
                month = args.get(i + 1)?.parse().ok();
                month?;
                i += 2;
            }
            "--year" => {
                year = args.get(i + 1)?.parse().ok();
                year?;
                i += 2;
            }
            s if pdf_path.is_none() => {
                pdf_path = Some(s.to_string());
                i += 1;
            }
            _ => return None,
        }
    }

    let period = match (month, year) {
        (Some(m), Some(y)) => Some((m, y)),
        (None, None) => None,
        // A reference period needs both parts.
        _ => return None,
    };

    Some(Args {
        pdf_path: pdf_path?,
        period,
    })
}

fn validate_pdf(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("file too small to be a valid PDF".to_string());
    }

    if bytes.len() > MAX_PDF_SIZE {
        return Err(format!(
            "PDF file too large ({} MB), maximum is {} MB",
            bytes.len() / (1024 * 1024),
            MAX_PDF_SIZE / (1024 * 1024)
        ));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err("invalid PDF file: header missing".to_string());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Some(a) => a,
        None => {
            eprintln!("Usage: income_extractor <path_to_pdf> [--month <1-12> --year <yyyy>]");
            return ExitCode::from(1);
        }
    };

    // Read the PDF file
    let bytes = match fs::read(&args.pdf_path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("READ_ERROR:{}", e);
            return ExitCode::from(2);
        }
    };

    // Validate PDF structure
    if let Err(e) = validate_pdf(&bytes) {
        eprintln!("VALIDATE_ERROR:{}", e);
        return ExitCode::from(4);
    }

    // Extract candidates
    let candidates = match parse_pdf(Path::new(&args.pdf_path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("EXTRACT_ERROR:{}", e);
            return ExitCode::from(3);
        }
    };

    let json = match args.period {
        Some((month, year)) => {
            let source = Path::new(&args.pdf_path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&args.pdf_path);
            match to_forecast_records(candidates, source, month, year) {
                Ok(records) => serde_json::to_string_pretty(&records),
                Err(e) => {
                    eprintln!("VALIDATE_ERROR:{}", e);
                    return ExitCode::from(4);
                }
            }
        }
        None => serde_json::to_string_pretty(&candidates),
    };

    match json {
        Ok(out) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            if let Err(e) = handle.write_all(out.as_bytes()) {
                eprintln!("WRITE_ERROR:{}", e);
                return ExitCode::from(3);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("WRITE_ERROR:{}", e);
            ExitCode::from(3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        std::iter::once("income_extractor")
            .chain(parts.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args() {
        let args = parse_args(&argv(&["fatura.pdf"])).unwrap();
        assert_eq!(args.pdf_path, "fatura.pdf");
        assert_eq!(args.period, None);

        let args = parse_args(&argv(&["fatura.pdf", "--month", "5", "--year", "2024"])).unwrap();
        assert_eq!(args.period, Some((5, 2024)));

        assert!(parse_args(&argv(&[])).is_none());
        // Half a reference period is an error.
        assert!(parse_args(&argv(&["fatura.pdf", "--month", "5"])).is_none());
        assert!(parse_args(&argv(&["fatura.pdf", "--month", "abc", "--year", "2024"])).is_none());
    }

    #[test]
    fn test_validate_pdf() {
        assert!(validate_pdf(b"%PDF-1.7 rest of file").is_ok());
        assert!(validate_pdf(b"tiny").is_err());
        assert!(validate_pdf(b"<html>not a pdf</html>").is_err());
    }
}
