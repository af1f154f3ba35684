//! JSON line I/O for the CLI
//!
//! - Input: one JSON object per line on stdin
//! - Output: one JSON object per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use super::errors::{CliError, CliResult};

/// Read one request line from `input`
pub fn read_request<R: BufRead>(input: &mut R) -> CliResult<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(line)
}

/// Non-blank request lines from `input`, until EOF
pub fn read_requests<R: BufRead>(input: R) -> impl Iterator<Item = CliResult<String>> {
    input
        .lines()
        .map(|line| line.map_err(CliError::from))
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
}

/// Write a raw JSON string as one line
pub fn write_json<W: Write>(out: &mut W, json_str: &str) -> CliResult<()> {
    writeln!(out, "{}", json_str)?;
    out.flush()?;
    Ok(())
}

/// Write an error response line to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(&mut io::stdout().lock(), &response.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_requests_skips_blank_lines() {
        let input = Cursor::new("{\"op\":\"list_tables\"}\n\n  \n{\"op\":\"export\"}\n");
        let lines: Vec<String> = read_requests(input).map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["{\"op\":\"list_tables\"}", "{\"op\":\"export\"}"]);
    }

    #[test]
    fn test_read_request_rejects_empty() {
        let mut input = Cursor::new("   \n");
        assert!(read_request(&mut input).is_err());
    }

    #[test]
    fn test_write_json_appends_newline() {
        let mut out = Vec::new();
        write_json(&mut out, "{}").unwrap();
        assert_eq!(out, b"{}\n");
    }
}
