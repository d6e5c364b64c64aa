// # 📂 src/stream/framing/assembler.rs

use bytes::{Buf, BytesMut};
use memchr::memmem::Finder;

use crate::constants::{DEFAULT_RECV_CHUNK_SIZE, FRAME_MARKER, NEXT_MARKER_SEARCH_OFFSET};
use crate::stream::framing::types::{AssemblyPass, Frame, FramingAnomaly, RetainPolicy};

/// Turns an ordered sequence of arbitrarily split chunks into frames.
///
/// The buffer is owned exclusively by the assembler. A frame is only cut once
/// the marker that follows it has arrived, so the tail of the buffer always
/// holds the (possibly partial) newest frame.
pub struct FrameAssembler {
    buffer: BytesMut,
    finder: Finder<'static>,
    policy: RetainPolicy,
}

impl FrameAssembler {
    pub fn new(policy: RetainPolicy) -> Self {
        Self {
            buffer: BytesMut::with_capacity(DEFAULT_RECV_CHUNK_SIZE * 2),
            finder: Finder::new(&FRAME_MARKER).into_owned(),
            policy,
        }
    }

    pub fn policy(&self) -> RetainPolicy {
        self.policy
    }

    /// Bytes currently held back waiting for more input.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Append one chunk and cut every frame that is now complete.
    pub fn push(&mut self, chunk: &[u8]) -> AssemblyPass {
        self.buffer.extend_from_slice(chunk);

        let mut pass = AssemblyPass::default();
        loop {
            let Some(first) = self.finder.find(&self.buffer) else {
                let keep = self.policy.retained_len().min(self.buffer.len());
                let discarded = self.buffer.len() - keep;
                if discarded > 0 {
                    self.buffer.advance(discarded);
                    pass.anomalies.push(FramingAnomaly::NoMarker { discarded });
                }
                break;
            };

            // The next marker is searched from first + 2, not first + 4.
            let search_from = first + NEXT_MARKER_SEARCH_OFFSET;
            let next = self
                .buffer
                .get(search_from..)
                .and_then(|tail| self.finder.find(tail));
            let Some(relative) = next else {
                break;
            };
            let second = search_from + relative;

            if first > 0 {
                pass.anomalies.push(FramingAnomaly::LeadingNoise { discarded: first });
            }

            let mut consumed = self.buffer.split_to(second);
            consumed.advance(first);
            pass.frames.push(Frame::new(consumed.freeze()));
        }

        pass
    }

    /// End of stream: hand back whatever never became a complete frame.
    pub fn finish(self) -> BytesMut {
        self.buffer
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new(RetainPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: [u8; 4] = FRAME_MARKER;

    #[test]
    fn waits_for_second_marker() {
        let mut asm = FrameAssembler::default();
        let pass = asm.push(&[&M[..], b"abc"].concat());
        assert!(pass.frames.is_empty());
        assert_eq!(asm.pending(), 7);
    }

    #[test]
    fn noise_without_marker_keeps_one_byte() {
        let mut asm = FrameAssembler::default();
        let pass = asm.push(b"noise");
        assert_eq!(pass.anomalies, vec![FramingAnomaly::NoMarker { discarded: 4 }]);
        assert_eq!(&asm.finish()[..], b"e");
    }

    #[test]
    fn marker_prefix_policy_keeps_three_bytes() {
        let mut asm = FrameAssembler::new(RetainPolicy::MarkerPrefix);
        assert_eq!(asm.policy(), RetainPolicy::MarkerPrefix);
        asm.push(b"noise");
        assert_eq!(asm.pending(), 3);
    }
}
