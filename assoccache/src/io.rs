use std::fs::File;
use std::io::BufRead;

pub fn get_reader(file: File) -> Result<impl BufRead, String> {
    // Compatibility on other systems
    #[cfg(not(unix))]
    {
        use std::io::BufReader;
        // Scripts are short lines, 4096 is the standard block size (or a multiple of it) on most systems
        const BUFFER_SIZE: usize = 16 * 4096;
        Ok(BufReader::with_capacity(BUFFER_SIZE, file))
    }
    // Memory map the file on unix systems, the script is only ever read front to back
    #[cfg(unix)]
    {
        use std::io::Cursor;
        use memmap2::{Advice, Mmap};
        // Safety: the script is opened read-only and isn't expected to change while it's simulated
        unsafe {
            let m = Mmap::map(&file).map_err(|e| format!("Couldn't memory map the file: {e}"))?;
            m.advise(Advice::Sequential).map_err(|e| format!("Failed to provide access advice to the OS, {e}"))?;
            Ok(Cursor::new(m))
        }
    }
}
