#![no_main]
use libfuzzer_sys::fuzz_target;
use textkit::{ParsingPosition, parse_utils, utf16};

fuzz_target!(|units: Vec<u16>| {
    let mut pos = ParsingPosition::new(0);
    let mut ours = Vec::new();
    while pos.index() < units.len() {
        let before = pos.index();
        match utf16::get_next(&mut pos, &units, units.len()) {
            Ok(code_point) => ours.push(Some(code_point)),
            Err(_) => {
                assert_eq!(pos.index(), before, "failed read moved the cursor");
                ours.push(None);
                let resume = pos.error_index().expect("error index").max(before + 1);
                pos.reset(resume);
            }
        }
    }
    let core: Vec<Option<u32>> = char::decode_utf16(units.iter().copied())
        .map(|r| r.ok().map(u32::from))
        .collect();
    assert_eq!(ours, core);

    // Blank skipping never splits a pair and never overshoots.
    let mut pos = ParsingPosition::new(0);
    while pos.index() < units.len() {
        let before = pos.index();
        let skipped = parse_utils::skip_blanks(&mut pos, &units, units.len())
            .and_then(|()| parse_utils::skip_non_blanks(&mut pos, &units, units.len()));
        assert!(pos.index() <= units.len());
        if pos.index() < units.len() {
            assert!(!utf16::is_trailing(units[pos.index()]) || skipped.is_err());
        }
        if skipped.is_err() || pos.index() == before {
            break;
        }
    }

    // Escapes always decode back to the same units.
    for &unit in &units {
        let escaped = utf16::escaped(u32::from(unit)).expect("unit escapes");
        let parsed = u16::from_str_radix(&escaped[2..], 16).expect("hex");
        assert_eq!(parsed, unit);
    }
});
