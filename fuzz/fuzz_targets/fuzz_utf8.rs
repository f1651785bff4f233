#![no_main]
use libfuzzer_sys::fuzz_target;
use textkit::{CodecError, ParsingPosition, utf8};

fuzz_target!(|data: &[u8]| {
    // Forward: agree with core on the valid prefix and the kind of error.
    let mut pos = ParsingPosition::new(0);
    let mut decoded = Vec::new();
    let mut failure = None;
    while pos.index() < data.len() {
        let before = pos.index();
        match utf8::get_next(&mut pos, data, data.len()) {
            Ok(code_point) => {
                assert_eq!(pos.index() - before, utf8::len_of(code_point));
                decoded.push(code_point);
            }
            Err(err) => {
                assert_eq!(pos.index(), before, "failed read moved the cursor");
                failure = Some((err, before, pos.error_index().expect("error index")));
                break;
            }
        }
    }
    match core::str::from_utf8(data) {
        Ok(s) => {
            assert!(failure.is_none());
            assert!(decoded.iter().copied().eq(s.chars().map(u32::from)));
        }
        Err(e) => {
            let (err, at, index) = failure.expect("core rejected the input");
            assert_eq!(at, e.valid_up_to());
            match e.error_len() {
                None => {
                    assert_eq!(err, CodecError::IncompleteUnicode);
                    assert_eq!(index, data.len());
                }
                Some(len) => {
                    assert_eq!(err, CodecError::MalformedUnicode);
                    assert_eq!(index.max(at + 1), at + usize::from(len));
                }
            }
        }
    }

    // Snapping: every index of the valid prefix snaps to a boundary.
    let valid = match core::str::from_utf8(data) {
        Ok(s) => s,
        Err(e) => core::str::from_utf8(&data[..e.valid_up_to()]).expect("valid prefix"),
    };
    let bytes = valid.as_bytes();
    for index in 0..=bytes.len() {
        let mut pos = ParsingPosition::new(index);
        utf8::set_to_start(&mut pos, bytes, 0).expect("snap to start");
        assert!(valid.is_char_boundary(pos.index()) && pos.index() <= index);
        let mut pos = ParsingPosition::new(index);
        utf8::set_to_terminal(&mut pos, bytes, bytes.len()).expect("snap to terminal");
        assert!(valid.is_char_boundary(pos.index()) && pos.index() >= index);
    }

    // Backward over the valid prefix mirrors forward.
    let mut pos = ParsingPosition::new(bytes.len());
    let mut backward = Vec::new();
    while pos.index() > 0 {
        backward.push(utf8::get_previous(&mut pos, bytes, 0).expect("step back"));
    }
    backward.reverse();
    assert!(backward.iter().copied().eq(valid.chars().map(u32::from)));
});
