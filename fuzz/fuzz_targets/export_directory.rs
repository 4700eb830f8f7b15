#![no_main]

use edata::prelude::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a loaded image: the decoder must fail cleanly, never panic.
    let loaded = Loaded::new(data);
    let location = DirectoryLocation {
        rva: 0,
        size: u32::try_from(data.len()).unwrap_or(u32::MAX),
    };
    let _ = ExportDirectory::read(&loaded, location, 0, 0);

    // Arbitrary bytes as a PE file end to end.
    if let Ok(file) = File::from_mem(data.to_vec()) {
        let _ = ExportDirectory::from_file(&file);
    }

    // Arbitrary bytes as the round-trip format.
    let _ = ExportTable::deserialize(&mut Parser::new(data));
});
