//! Process-wide codec built from `ENCRYPTION_KEY`.
//!
//! Runs in its own process, so setting the environment here cannot leak into
//! other tests. Keep to a single test function for the same reason.

use std::sync::Barrier;
use std::thread;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_secretbox::{
    aead::{Aead, KeyInit},
    Key, Nonce, XSalsa20Poly1305,
};
use field_crypt::{decrypt, encrypt, FieldCodec, Format};

const KEY: [u8; 32] = [0x5A; 32];

#[test]
fn shared_codec_loads_once_and_reads_every_era() {
    std::env::set_var("ENCRYPTION_KEY", STANDARD.encode(KEY));

    // Cold start: many callers race for the first load.
    let barrier = Barrier::new(8);
    let addrs: Vec<usize> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    FieldCodec::shared().unwrap() as *const FieldCodec as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(addrs.windows(2).all(|w| w[0] == w[1]));

    // Current format through the free functions.
    let url = "https://example.com/path?q=1";
    let blob = encrypt(url).unwrap();
    assert_ne!(blob, encrypt(url).unwrap());
    assert_eq!(decrypt(&blob).unwrap(), url);
    assert_eq!(decrypt("").unwrap(), "");
    assert_eq!(decrypt("hello world").unwrap(), "hello world");

    // A freshly built codec with the same key reads what the shared one wrote.
    let restarted = FieldCodec::from_env().unwrap();
    assert_eq!(restarted.decrypt(&blob), url);

    // Secretbox rows written by an older generation under the same key.
    let legacy = XSalsa20Poly1305::new(Key::from_slice(&KEY));
    let nonce = [0x33u8; 24];
    let sealed = legacy
        .encrypt(Nonce::from_slice(&nonce), "Old title 📌".as_bytes())
        .unwrap();
    let stored = STANDARD.encode([nonce.as_slice(), &sealed].concat());
    let decoded = FieldCodec::shared().unwrap().inspect(&stored);
    assert_eq!(decoded.format, Format::LegacySecretbox);
    assert_eq!(decoded.plaintext, "Old title 📌");
}
