//! Wire encoding for chunk packets (§6).
//!
//! Grounded on the reference engine's `ServerPacketData.hpp` struct
//! layout and `ChunkSystem::parseChunkData`. The in-memory `ChunkData`/
//! `RLEPair` structs there are `memcpy`'d straight off the wire, which
//! only works because the source always runs on the same platform on
//! both ends; here the header and each RLE pair are encoded into an
//! explicit little-endian byte layout instead of relying on Rust struct
//! layout (which is not guaranteed stable), so the format is actually
//! portable.
//!
//! Header: `x: i32, y: i32, z: i32, dataSize: i32, highestPoint: i8`
//! (17 bytes, no padding), followed by `dataSize` run-length pairs of
//! `id: u8, count: u16` (3 bytes each, also unpadded).

use glam::IVec3;

use crate::chunk::{compress, decompress, Chunk, RlePair};
use crate::error::{PipelineError, PipelineResult};
use crate::grid::ChunkGrid;

const HEADER_LEN: usize = 4 + 4 + 4 + 4 + 1;
const RLE_PAIR_LEN: usize = 1 + 2;

/// Encodes `chunk`'s position, highest point, and RLE-compressed voxels
/// into a tightly packed byte buffer ready for network transport.
pub fn encode_chunk_packet(chunk: &Chunk) -> Vec<u8> {
    let compressed = compress(chunk.voxels());
    let mut buf = Vec::with_capacity(HEADER_LEN + compressed.len() * RLE_PAIR_LEN);

    let pos = chunk.position();
    buf.extend_from_slice(&pos.x.to_le_bytes());
    buf.extend_from_slice(&pos.y.to_le_bytes());
    buf.extend_from_slice(&pos.z.to_le_bytes());
    buf.extend_from_slice(&(compressed.len() as i32).to_le_bytes());
    buf.push(chunk.highest_point() as u8);

    for pair in &compressed {
        buf.push(pair.id);
        buf.extend_from_slice(&pair.count.to_le_bytes());
    }

    buf
}

struct DecodedPacket {
    position: IVec3,
    highest_point: i8,
    voxels: Vec<u8>,
}

fn decode_chunk_packet(bytes: &[u8]) -> PipelineResult<DecodedPacket> {
    if bytes.len() < HEADER_LEN {
        return Err(PipelineError::MalformedChunkPacket(format!(
            "packet of {} bytes is shorter than the {HEADER_LEN}-byte header",
            bytes.len()
        )));
    }

    let read_i32 = |offset: usize| i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());

    let x = read_i32(0);
    let y = read_i32(4);
    let z = read_i32(8);
    let data_size = read_i32(12);
    let highest_point = bytes[16] as i8;

    if data_size < 0 {
        return Err(PipelineError::MalformedChunkPacket(format!(
            "negative dataSize: {data_size}"
        )));
    }

    let expected_len = HEADER_LEN + data_size as usize * RLE_PAIR_LEN;
    if bytes.len() != expected_len {
        return Err(PipelineError::MalformedChunkPacket(format!(
            "packet is {} bytes, expected {expected_len} for dataSize {data_size}",
            bytes.len()
        )));
    }

    let mut compressed = Vec::with_capacity(data_size as usize);
    for i in 0..data_size as usize {
        let offset = HEADER_LEN + i * RLE_PAIR_LEN;
        let id = bytes[offset];
        let count = u16::from_le_bytes([bytes[offset + 1], bytes[offset + 2]]);
        compressed.push(RlePair::new(id, count));
    }

    let voxels = decompress(&compressed)?;

    Ok(DecodedPacket {
        position: IVec3::new(x, y, z),
        highest_point,
        voxels,
    })
}

/// Decodes `bytes` and inserts the chunk into `grid` at the position the
/// packet carries, unless a chunk is already present there (matching the
/// reference's `hasChunk` guard - the first packet for a position wins).
/// Returns `Ok(true)` if a chunk was inserted, `Ok(false)` if it was
/// skipped because the slot was already occupied.
pub fn ingest_chunk_packet(grid: &ChunkGrid, bytes: &[u8]) -> PipelineResult<bool> {
    let packet = decode_chunk_packet(bytes)?;

    if grid.has_chunk(packet.position) {
        return Ok(false);
    }

    let inserted = grid.with_chunk_mut(packet.position, |chunk| {
        *chunk.voxels_mut() = packet.voxels;
        chunk.set_highest_point(packet.highest_point);
    });

    match inserted {
        Some(()) => Ok(true),
        None => Err(PipelineError::MalformedChunkPacket(format!(
            "chunk position {:?} is outside the loaded grid",
            packet.position
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_encode_and_decode() {
        // S8
        let mut chunk = Chunk::new(IVec3::new(1, 2, 3));
        chunk.set_voxel_q(IVec3::new(0, 0, 0), 5);
        crate::chunk::recompute_highest_point(&mut chunk);

        let bytes = encode_chunk_packet(&chunk);
        let decoded = decode_chunk_packet(&bytes).unwrap();

        assert_eq!(decoded.position, IVec3::new(1, 2, 3));
        assert_eq!(decoded.highest_point, chunk.highest_point());
        assert_eq!(decoded.voxels, *chunk.voxels());
    }

    #[test]
    fn rejects_packet_shorter_than_header() {
        // S7
        let bytes = [0u8; HEADER_LEN - 1];
        assert!(matches!(
            decode_chunk_packet(&bytes),
            Err(PipelineError::MalformedChunkPacket(_))
        ));
    }

    #[test]
    fn rejects_packet_with_mismatched_data_size() {
        // S7
        let mut bytes = vec![0u8; HEADER_LEN];
        bytes[12..16].copy_from_slice(&5i32.to_le_bytes()); // claims 5 pairs, has 0
        assert!(matches!(
            decode_chunk_packet(&bytes),
            Err(PipelineError::MalformedChunkPacket(_))
        ));
    }

    #[test]
    fn ingest_skips_chunk_already_present() {
        let grid = ChunkGrid::new(2);
        let mut chunk = Chunk::new(IVec3::ZERO);
        chunk.set_voxel_q(IVec3::new(0, 0, 0), 3);
        crate::chunk::recompute_highest_point(&mut chunk);
        grid.with_chunk_mut(IVec3::ZERO, |c| {
            *c.voxels_mut() = chunk.voxels().clone();
            c.set_highest_point(chunk.highest_point());
        });

        let bytes = encode_chunk_packet(&chunk);
        assert_eq!(ingest_chunk_packet(&grid, &bytes).unwrap(), false);
    }

    #[test]
    fn ingest_inserts_new_chunk() {
        let grid = ChunkGrid::new(2);
        let mut chunk = Chunk::new(IVec3::new(1, 0, 0));
        chunk.set_voxel_q(IVec3::new(2, 2, 2), 9);
        crate::chunk::recompute_highest_point(&mut chunk);

        let bytes = encode_chunk_packet(&chunk);
        assert_eq!(ingest_chunk_packet(&grid, &bytes).unwrap(), true);
        assert!(grid.has_chunk(IVec3::new(1, 0, 0)));
    }
}
