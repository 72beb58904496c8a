#![no_main]

use libfuzzer_sys::fuzz_target;
use simplesearch::session::SearchSession;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must either load or fail with an error, never panic
    if let Ok(mut session) = SearchSession::read_from(&mut &data[..]) {
        let _ = session.search_str("a b, c -p");
        session.index().reconstruct_documents();
    }
});
