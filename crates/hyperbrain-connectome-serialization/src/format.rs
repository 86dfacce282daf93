// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Buffer layout and codec
//!
//! ```text
//! [Header]
//! - Magic: "HGRPH" or "HBCKP" (5 bytes)
//! - Version: u32 (4 bytes)
//! - Flags: u8 (1 byte) - bit 0: compressed
//! - Uncompressed Size: u64 (8 bytes, size of the bincode payload before compression)
//! - Payload Length: u64 (8 bytes, must equal the bytes that follow the header)
//! - Checksum: u64 (8 bytes, FNV-1a of the stored payload)
//! [Data]
//! - Bincode-serialized snapshot (optionally LZ4 compressed)
//! ```

use crate::{CheckpointSnapshot, ConnectomeError, GraphSnapshot, Result};
use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

/// Magic number for raw graph buffers
pub const GRAPH_MAGIC: &[u8; 5] = b"HGRPH";

/// Magic number for checkpoint buffers and files
pub const CHECKPOINT_MAGIC: &[u8; 5] = b"HBCKP";

/// Current raw graph format version (increment when the layout changes)
pub const GRAPH_FORMAT_VERSION: u32 = 1;

/// Current checkpoint format version (increment when the layout changes)
pub const CHECKPOINT_FORMAT_VERSION: u32 = 1;

/// Upper bound for any declared payload size
pub const MAX_PAYLOAD_BYTES: u64 = 1 << 30;

/// Fixed header size in bytes
pub const HEADER_LEN: usize = 5 + 4 + 1 + 8 + 8 + 8;

const FLAG_COMPRESSED: u8 = 0b0000_0001;
const KNOWN_FLAGS: u8 = FLAG_COMPRESSED;

// Offsets into the header
const VERSION_OFFSET: usize = 5;
const FLAGS_OFFSET: usize = 9;
const SIZE_OFFSET: usize = 10;
const LEN_OFFSET: usize = 18;
const CHECKSUM_OFFSET: usize = 26;

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(MAX_PAYLOAD_BYTES)
}

/// Encode the bare graph (never compressed)
pub fn encode_graph(graph: &GraphSnapshot) -> Result<Vec<u8>> {
    let payload = serialize_payload(graph)?;
    Ok(write_frame(GRAPH_MAGIC, GRAPH_FORMAT_VERSION, 0, payload.len() as u64, payload))
}

/// Decode a buffer produced by [`encode_graph`]
pub fn decode_graph(bytes: &[u8]) -> Result<GraphSnapshot> {
    let payload = read_frame(bytes, GRAPH_MAGIC, GRAPH_FORMAT_VERSION)?;
    deserialize_payload(&payload)
}

/// Encode a checkpoint, compressing the payload when the `compression` feature is enabled
pub fn encode_checkpoint(checkpoint: &CheckpointSnapshot) -> Result<Vec<u8>> {
    let data = serialize_payload(checkpoint)?;
    let uncompressed_size = data.len() as u64;

    #[cfg(feature = "compression")]
    let (final_data, flags) = {
        let compressed = lz4::block::compress(&data, None, false)
            .map_err(|e| ConnectomeError::Compression(e.to_string()))?;
        (compressed, FLAG_COMPRESSED)
    };

    #[cfg(not(feature = "compression"))]
    let (final_data, flags) = (data, 0u8);

    Ok(write_frame(
        CHECKPOINT_MAGIC,
        CHECKPOINT_FORMAT_VERSION,
        flags,
        uncompressed_size,
        final_data,
    ))
}

/// Decode a buffer produced by [`encode_checkpoint`]
pub fn decode_checkpoint(bytes: &[u8]) -> Result<CheckpointSnapshot> {
    let payload = read_frame(bytes, CHECKPOINT_MAGIC, CHECKPOINT_FORMAT_VERSION)?;
    let checkpoint: CheckpointSnapshot = deserialize_payload(&payload)?;
    if checkpoint.format_version != CHECKPOINT_FORMAT_VERSION {
        return Err(ConnectomeError::VersionMismatch {
            file_version: checkpoint.format_version,
            expected_version: CHECKPOINT_FORMAT_VERSION,
        });
    }
    Ok(checkpoint)
}

/// Write a checkpoint file
pub fn save_checkpoint_file<P: AsRef<Path>>(checkpoint: &CheckpointSnapshot, path: P) -> Result<()> {
    let bytes = encode_checkpoint(checkpoint)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a checkpoint file
pub fn load_checkpoint_file<P: AsRef<Path>>(path: P) -> Result<CheckpointSnapshot> {
    let bytes = std::fs::read(path)?;
    decode_checkpoint(&bytes)
}

/// Read only the version field of a buffer, without validating anything past it
pub fn peek_version(bytes: &[u8]) -> Option<u32> {
    read_u32(bytes, VERSION_OFFSET)
}

fn serialize_payload<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    codec()
        .serialize(value)
        .map_err(|e| ConnectomeError::Serialization(e.to_string()))
}

fn deserialize_payload<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    codec()
        .deserialize(data)
        .map_err(|e| ConnectomeError::Deserialization(e.to_string()))
}

fn write_frame(
    magic: &[u8; 5],
    version: u32,
    flags: u8,
    uncompressed_size: u64,
    payload: Vec<u8>,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(magic);
    out.extend_from_slice(&version.to_le_bytes());
    out.push(flags);
    out.extend_from_slice(&uncompressed_size.to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&calculate_checksum(&payload).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Validate the header and return the (decompressed) payload
fn read_frame(bytes: &[u8], magic: &[u8; 5], expected_version: u32) -> Result<Vec<u8>> {
    if bytes.len() < HEADER_LEN {
        return Err(ConnectomeError::Truncated {
            needed: HEADER_LEN,
            available: bytes.len(),
        });
    }

    let mut found = [0u8; 5];
    found.copy_from_slice(&bytes[..5]);
    if &found != magic {
        return Err(ConnectomeError::InvalidMagic {
            expected: *magic,
            found,
        });
    }

    let version = read_u32(bytes, VERSION_OFFSET).unwrap_or_default();
    if version != expected_version {
        return Err(ConnectomeError::VersionMismatch {
            file_version: version,
            expected_version,
        });
    }

    let flags = bytes[FLAGS_OFFSET];
    if flags & !KNOWN_FLAGS != 0 {
        return Err(ConnectomeError::Deserialization(format!(
            "unknown header flags {:#010b}",
            flags
        )));
    }
    let is_compressed = flags & FLAG_COMPRESSED != 0;

    let uncompressed_size = read_u64(bytes, SIZE_OFFSET).unwrap_or_default();
    let payload_len = read_u64(bytes, LEN_OFFSET).unwrap_or_default();
    let expected_checksum = read_u64(bytes, CHECKSUM_OFFSET).unwrap_or_default();

    for declared in [uncompressed_size, payload_len] {
        if declared > MAX_PAYLOAD_BYTES {
            return Err(ConnectomeError::PayloadTooLarge {
                declared,
                limit: MAX_PAYLOAD_BYTES,
            });
        }
    }

    let stored = &bytes[HEADER_LEN..];
    if payload_len != stored.len() as u64 {
        return Err(ConnectomeError::LengthMismatch {
            declared: payload_len,
            actual: stored.len(),
        });
    }

    if calculate_checksum(stored) != expected_checksum {
        return Err(ConnectomeError::ChecksumMismatch);
    }

    if !is_compressed {
        if uncompressed_size != payload_len {
            return Err(ConnectomeError::LengthMismatch {
                declared: uncompressed_size,
                actual: stored.len(),
            });
        }
        return Ok(stored.to_vec());
    }

    // LZ4 cannot expand data by more than ~255x
    if uncompressed_size > payload_len.saturating_mul(255).saturating_add(64) {
        return Err(ConnectomeError::LengthMismatch {
            declared: uncompressed_size,
            actual: stored.len(),
        });
    }

    #[cfg(feature = "compression")]
    {
        let data = lz4::block::decompress(stored, Some(uncompressed_size as i32))
            .map_err(|e| ConnectomeError::Compression(format!("Decompression failed: {}", e)))?;
        if data.len() as u64 != uncompressed_size {
            return Err(ConnectomeError::LengthMismatch {
                declared: uncompressed_size,
                actual: data.len(),
            });
        }
        Ok(data)
    }
    #[cfg(not(feature = "compression"))]
    {
        Err(ConnectomeError::Compression(
            "Buffer is compressed but compression feature is not enabled".to_string(),
        ))
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let raw: [u8; 4] = bytes.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(raw))
}

fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let raw: [u8; 8] = bytes.get(offset..offset + 8)?.try_into().ok()?;
    Some(u64::from_le_bytes(raw))
}

/// FNV-1a over the stored payload
pub(crate) fn calculate_checksum(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegionRecord;
    use hyperbrain_npu_neural::{
        ActivationPattern, Neuron, NeuronId, NeuronParameters, RegionId, RegionKind, Synapse,
        SynapseId, SynapseType,
    };
    use proptest::prelude::*;

    fn sample_graph() -> GraphSnapshot {
        let params = NeuronParameters::default();
        GraphSnapshot {
            regions: vec![RegionRecord {
                id: RegionId(0),
                name: "sensory".to_string(),
                kind: RegionKind::Cortical,
                activation_pattern: ActivationPattern::Asynchronous,
                neuron_params: params,
                neurons: vec![
                    Neuron::new(NeuronId(0), params),
                    Neuron::new(NeuronId(1), params),
                ],
            }],
            synapses: vec![Synapse::new(
                SynapseId(0),
                NeuronId(0),
                NeuronId(1),
                0.42,
                SynapseType::Inhibitory,
            )],
            tick_count: 17,
            next_region_id: 1,
            next_neuron_id: 2,
            next_synapse_id: 1,
        }
    }

    #[test]
    fn test_checkpoint_roundtrip_keeps_provenance() {
        let checkpoint = CheckpointSnapshot::new(sample_graph(), "unit-test", "two neurons")
            .with_metadata("phase", "warmup");
        let bytes = encode_checkpoint(&checkpoint).unwrap();
        let loaded = decode_checkpoint(&bytes).unwrap();

        assert_eq!(loaded.creator, "unit-test");
        assert_eq!(loaded.description, "two neurons");
        assert_eq!(loaded.metadata.get("phase").map(String::as_str), Some("warmup"));
        assert_eq!(loaded.graph, checkpoint.graph);
    }

    #[test]
    fn test_graph_buffer_is_not_a_checkpoint() {
        let bytes = encode_graph(&sample_graph()).unwrap();
        assert!(matches!(
            decode_checkpoint(&bytes),
            Err(ConnectomeError::InvalidMagic { .. })
        ));
        assert_eq!(decode_graph(&bytes).unwrap().tick_count, 17);
    }

    #[test]
    fn test_version_checked_before_payload() {
        let mut bytes = encode_graph(&sample_graph()).unwrap();
        bytes[VERSION_OFFSET..VERSION_OFFSET + 4].copy_from_slice(&99u32.to_le_bytes());
        // Payload garbage must not matter once the version is wrong
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            decode_graph(&bytes),
            Err(ConnectomeError::VersionMismatch {
                file_version: 99,
                ..
            })
        ));
        assert_eq!(peek_version(&bytes), Some(99));
    }

    #[test]
    fn test_truncated_and_empty() {
        assert!(matches!(
            decode_checkpoint(&[]),
            Err(ConnectomeError::Truncated { available: 0, .. })
        ));
        let bytes = encode_checkpoint(&CheckpointSnapshot::new(sample_graph(), "t", "")).unwrap();
        assert!(matches!(
            decode_checkpoint(&bytes[..bytes.len() - 3]),
            Err(ConnectomeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_bit_flip_detected() {
        let mut bytes = encode_graph(&sample_graph()).unwrap();
        bytes[HEADER_LEN + 4] ^= 0x10;
        assert!(matches!(
            decode_graph(&bytes),
            Err(ConnectomeError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_oversized_declaration_rejected() {
        let mut bytes = encode_graph(&sample_graph()).unwrap();
        bytes[LEN_OFFSET..LEN_OFFSET + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert!(matches!(
            decode_graph(&bytes),
            Err(ConnectomeError::PayloadTooLarge { .. })
        ));
    }

    #[test]
    fn test_checksum() {
        assert_eq!(calculate_checksum(b"hello world"), calculate_checksum(b"hello world"));
        assert_ne!(calculate_checksum(b"hello world"), calculate_checksum(b"hello worlD"));
    }

    proptest! {
        #[test]
        fn prop_arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let _ = decode_graph(&bytes);
            let _ = decode_checkpoint(&bytes);
        }

        #[test]
        fn prop_any_single_bit_flip_is_rejected(index in 0usize..4096, bit in 0u8..8) {
            let bytes = encode_checkpoint(&CheckpointSnapshot::new(sample_graph(), "p", "flip")).unwrap();
            let mut corrupted = bytes.clone();
            let index = index % corrupted.len();
            corrupted[index] ^= 1 << bit;
            prop_assert!(decode_checkpoint(&corrupted).is_err());
        }
    }
}
