#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textkit::{CodecError, MalformedPolicy, ParsingPosition, TranscodeOptions, transcode};

#[derive(Arbitrary, Debug)]
struct Input {
    bytes: Vec<u8>,
    units: Vec<u16>,
    /// Destination capacity for the chunked conversion, at least 2.
    chunk: u8,
}

fuzz_target!(|input: Input| {
    let lossy = TranscodeOptions {
        on_malformed: MalformedPolicy::Replace,
        ..Default::default()
    };
    let expected: Vec<u16> = String::from_utf8_lossy(&input.bytes).encode_utf16().collect();
    assert_eq!(transcode::utf8_to_utf16(&input.bytes, &lossy), Ok(expected));
    let expected = String::from_utf16_lossy(&input.units).into_bytes();
    assert_eq!(transcode::utf16_to_utf8(&input.units, &lossy), Ok(expected));

    // Chunked conversion of well-formed text through a small buffer.
    let Ok(text) = core::str::from_utf8(&input.bytes) else {
        return;
    };
    let chunk = usize::from(input.chunk).max(2);
    let mut buf = vec![0u16; chunk];
    let mut out = Vec::new();
    let mut src = ParsingPosition::new(0);
    loop {
        let mut dst = ParsingPosition::new(0);
        let result =
            transcode::utf8_to_utf16_into(&mut src, text.as_bytes(), text.len(), &mut dst, &mut buf, chunk);
        out.extend_from_slice(&buf[..dst.index()]);
        match result {
            Ok(()) => break,
            Err(err) => assert_eq!(err, CodecError::BufferOverflow),
        }
    }
    assert!(out.iter().copied().eq(text.encode_utf16()));
});
