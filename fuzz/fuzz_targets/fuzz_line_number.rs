#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pdfmatch::search::line_number;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    text: &'a str,
    offset: u32,
}

fuzz_target!(|input: Input| {
    match line_number(input.text, input.offset) {
        Ok((line, text)) => {
            assert!((input.offset as usize) < input.text.len());
            assert!(line >= 1);
            assert!(!text.contains('\n'));
        }
        Err(_) => assert!(input.offset as usize >= input.text.len()),
    }
});
