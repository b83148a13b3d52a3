//! Fuzz target: `console::parse_line`
//!
//! Arbitrary UTF-8 lines must parse or be rejected, never panic.  Accepted
//! commands must also be stable under surrounding whitespace.
//!
//! cargo fuzz run fuzz_console_parse

#![no_main]

use guardian::adapters::console::{ParseError, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    // Lines are read with `lines()`, so they never contain a newline.
    if line.contains('\n') {
        return;
    }

    match parse_line(line) {
        Ok(cmd) => {
            let padded = format!("  {line}\t");
            assert_eq!(parse_line(&padded), Ok(cmd), "whitespace changed the command");
        }
        Err(ParseError::Empty) => assert!(line.trim().is_empty()),
        Err(_) => {}
    }
});
