//! Interactive dimension prompting
//!
//! Dimensions missing from the command line are read from stdin. The row
//! count of B is asked for explicitly and re-prompted until it equals the
//! column count of A.

use anyhow::{Context, bail};
use matbench_core::MatrixDims;
use std::io::{BufRead, Write};

/// Dimensions as given on the command line; `None` means "ask"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialDims {
    /// Rows of A
    pub rows_a: Option<usize>,
    /// Columns of A (and rows of B)
    pub cols_a: Option<usize>,
    /// Columns of B
    pub cols_b: Option<usize>,
}

impl PartialDims {
    /// All three dimensions, if given
    pub fn complete(&self) -> Option<MatrixDims> {
        Some(MatrixDims {
            m: self.rows_a?,
            k: self.cols_a?,
            n: self.cols_b?,
        })
    }
}

/// Fill in missing dimensions by prompting on `output` and reading `input`
pub fn resolve_dims<R: BufRead, W: Write>(
    given: PartialDims,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<MatrixDims> {
    if let Some(dims) = given.complete() {
        return Ok(dims);
    }

    let m = match given.rows_a {
        Some(m) => m,
        None => ask(input, output, "Enter the number of rows for Matrix A: ")?,
    };
    let k = match given.cols_a {
        Some(k) => k,
        None => ask(input, output, "Enter the number of columns for Matrix A: ")?,
    };

    let mut rows_b = ask(input, output, "Enter the number of rows for Matrix B: ")?;
    while rows_b != k {
        writeln!(
            output,
            "Number of columns for Matrix A must equal the number of rows for Matrix B."
        )?;
        rows_b = ask(input, output, "Enter the number of rows for Matrix B: ")?;
    }

    let n = match given.cols_b {
        Some(n) => n,
        None => ask(input, output, "Enter the number of columns for Matrix B: ")?,
    };

    Ok(MatrixDims { m, k, n })
}

/// Ask until a positive integer is entered
fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> anyhow::Result<usize> {
    loop {
        write!(output, "{question}")?;
        output.flush()?;

        let mut line = String::new();
        let read = input.read_line(&mut line).context("reading dimensions from stdin")?;
        if read == 0 {
            bail!("stdin closed while waiting for matrix dimensions");
        }

        match line.trim().parse::<usize>() {
            Ok(value) if value > 0 => return Ok(value),
            _ => writeln!(output, "Please enter a positive integer.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(given: PartialDims, stdin: &str) -> (anyhow::Result<MatrixDims>, String) {
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut output = Vec::new();
        let dims = resolve_dims(given, &mut input, &mut output);
        (dims, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_complete_dims_do_not_prompt() {
        let given = PartialDims {
            rows_a: Some(2),
            cols_a: Some(3),
            cols_b: Some(4),
        };
        let (dims, out) = run(given, "");
        assert_eq!(dims.unwrap(), MatrixDims { m: 2, k: 3, n: 4 });
        assert!(out.is_empty());
    }

    #[test]
    fn test_prompts_for_everything() {
        let (dims, out) = run(PartialDims::default(), "2\n3\n3\n4\n");
        assert_eq!(dims.unwrap(), MatrixDims { m: 2, k: 3, n: 4 });
        assert!(out.contains("rows for Matrix A"));
        assert!(out.contains("columns for Matrix B"));
    }

    #[test]
    fn test_reprompts_until_inner_dims_agree() {
        let (dims, out) = run(PartialDims::default(), "2\n3\n5\n4\n3\n6\n");
        assert_eq!(dims.unwrap(), MatrixDims { m: 2, k: 3, n: 6 });
        assert_eq!(out.matches("must equal").count(), 2);
    }

    #[test]
    fn test_rejects_garbage() {
        let given = PartialDims {
            rows_a: Some(2),
            cols_a: Some(2),
            cols_b: None,
        };
        let (dims, out) = run(given, "2\nabc\n0\n5\n");
        assert_eq!(dims.unwrap(), MatrixDims { m: 2, k: 2, n: 5 });
        assert_eq!(out.matches("positive integer").count(), 2);
    }

    #[test]
    fn test_eof_is_an_error() {
        let (dims, _) = run(PartialDims::default(), "2\n");
        assert!(dims.is_err());
    }
}
