/// Compute the high-order entropy (HOE) of a byte slice.
///
/// HOE = compressed_size / raw_size, where compression uses brotli at quality 2.
/// It approximates the normalized Kolmogorov complexity of the tape: an empty
/// tape or one dominated by a single replicator compresses far below 1.0,
/// while a tape full of mutational noise stays close to it.
pub fn high_order_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }

    let mut compressed = Vec::new();
    let params = brotli::enc::BrotliEncoderParams {
        quality: 2,
        ..Default::default()
    };
    // Writing into a Vec cannot fail; a failed compression reports as incompressible.
    if brotli::BrotliCompress(&mut &data[..], &mut compressed, &params).is_err() {
        return 1.0;
    }

    compressed.len() as f64 / data.len() as f64
}

/// Count how often each opcode appears on the tape.
pub fn opcode_histogram(cells: &[u8]) -> [usize; 256] {
    let mut hist = [0usize; 256];
    for &b in cells {
        hist[b as usize] += 1;
    }
    hist
}

/// Fraction of cells that hold something other than `NOP`.
pub fn occupancy(cells: &[u8]) -> f64 {
    if cells.is_empty() {
        return 0.0;
    }
    let hist = opcode_histogram(cells);
    (cells.len() - hist[crate::opcode::NOP as usize]) as f64 / cells.len() as f64
}
