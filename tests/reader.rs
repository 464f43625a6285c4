use std::io::{BufRead, Cursor, Read, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use reflate::reader::StateReader;
use reflate::Mode;

//Same corpus shape the session tests use: ASCII lines with a counter and a
//generated hex tail, compressible but not degenerate.
fn corpus(len: usize) -> Vec<u8> {
    const SENTENCES: [&str; 3] = [
        "the quick brown fox jumps over the lazy dog",
        "pack my box with five dozen liquor jugs",
        "how vexingly quick daft zebras jump",
    ];

    let mut data = Vec::with_capacity(len + 128);
    let mut seed = 0x2545f491_4f6cdd1du64;
    let mut n = 0usize;
    while data.len() < len {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        data.extend_from_slice(SENTENCES[n % SENTENCES.len()].as_bytes());
        data.extend_from_slice(format!(" {} {:016x}\n", n, seed).as_bytes());
        n += 1;
    }
    data.truncate(len);
    data
}

fn gzip(data: &[u8], flush_every: Option<usize>) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    match flush_every {
        Some(step) => for piece in data.chunks(step) {
            encoder.write_all(piece).expect("write");
            encoder.flush().expect("flush");
        },
        None => encoder.write_all(data).expect("write"),
    }
    encoder.finish().expect("finish")
}

#[test]
fn should_read_whole_gzip_stream() {
    let data = corpus(120 * 1024);
    let compressed = gzip(&data, None);

    let mut reader = StateReader::new(Cursor::new(&compressed), Mode::Gzip).expect("create reader");
    let mut plain = Vec::new();
    reader.read_to_end(&mut plain).expect("read to end");

    assert_eq!(plain, data);
    assert_eq!(reader.output_position(), data.len() as u64);
}

#[test]
fn should_capture_and_resume_checkpoints() {
    let data = corpus(200 * 1024);
    let compressed = gzip(&data, Some(40 * 1024));

    let mut reader = StateReader::new(Cursor::new(&compressed), Mode::Gzip)
        .expect("create reader")
        .keep_last_state(true);

    let mut consumed = 0usize;
    let mut lines = 0usize;
    let mut line = String::new();
    let mut checkpoint = None;
    loop {
        line.clear();
        let got = reader.read_line(&mut line).expect("read line");
        if got == 0 {
            break;
        }
        consumed += got;
        lines += 1;
        if checkpoint.is_none() && consumed >= 100 * 1024 {
            checkpoint = reader.last_state().cloned();
        }
    }
    println!("lines={} || consumed={}", lines, consumed);
    assert_eq!(consumed, data.len());

    let checkpoint = checkpoint.expect("checkpoint past 100 KiB");
    assert!(checkpoint.output_position > 0);
    assert!((checkpoint.output_position as usize) < data.len());

    let mut resumed = StateReader::new(Cursor::new(&compressed), Mode::Gzip).expect("create reader");
    resumed.resume(&checkpoint).expect("resume");
    let mut remainder = Vec::new();
    resumed.read_to_end(&mut remainder).expect("read remainder");

    assert_eq!(remainder, &data[checkpoint.output_position as usize..]);
    assert_eq!(resumed.output_position(), data.len() as u64);
}
