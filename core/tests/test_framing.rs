// Frame assembler behaviour across chunk boundaries:

// * frames are cut between consecutive markers, in order, byte-identical
// * noise ahead of the first marker is dropped and reported
// * the no-marker discard policy (`RetainPolicy`) decides whether a split
//   marker survives

#[cfg(test)]
mod tests {
    use frame_ingest_core::constants::FRAME_MARKER;
    use frame_ingest_core::stream::framing::{Frame, FrameAssembler, FramingAnomaly, RetainPolicy};
    use proptest::prelude::*;

    fn frame(body: &[u8]) -> Vec<u8> {
        [&FRAME_MARKER[..], body].concat()
    }

    /// Feed `stream` split at `cuts` and collect every frame produced.
    fn assemble(policy: RetainPolicy, stream: &[u8], cuts: &[usize]) -> (Vec<Frame>, Vec<FramingAnomaly>) {
        let mut asm = FrameAssembler::new(policy);
        let mut frames = Vec::new();
        let mut anomalies = Vec::new();

        let mut cuts: Vec<usize> = cuts.iter().map(|c| c % (stream.len() + 1)).collect();
        cuts.sort_unstable();
        cuts.dedup();

        let mut start = 0;
        for cut in cuts.into_iter().chain(std::iter::once(stream.len())) {
            let pass = asm.push(&stream[start..cut]);
            frames.extend(pass.frames);
            anomalies.extend(pass.anomalies);
            start = cut;
        }
        (frames, anomalies)
    }

// # ✅ 1. Basic cutting

    #[test]
    fn single_chunk_yields_frames_between_markers() {
        let stream = [frame(b"first"), frame(b"second"), frame(b"")].concat();
        let (frames, anomalies) = assemble(RetainPolicy::LastByte, &stream, &[]);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), &frame(b"first")[..]);
        assert_eq!(frames[1].as_bytes(), &frame(b"second")[..]);
        assert!(anomalies.is_empty());
    }

    #[test]
    fn last_frame_waits_for_next_marker() {
        let mut asm = FrameAssembler::default();
        let pass = asm.push(&[frame(b"one"), frame(b"two")].concat());

        assert_eq!(pass.frames.len(), 1);
        assert_eq!(asm.pending(), frame(b"two").len());
        assert_eq!(&asm.finish()[..], &frame(b"two")[..]);
    }

    #[test]
    fn leading_noise_is_dropped_and_reported() {
        let stream = [b"garbage".to_vec(), frame(b"payload"), frame(b"")].concat();
        let (frames, anomalies) = assemble(RetainPolicy::LastByte, &stream, &[]);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), &frame(b"payload")[..]);
        assert_eq!(anomalies, vec![FramingAnomaly::LeadingNoise { discarded: 7 }]);
    }

    #[test]
    fn back_to_back_markers_yield_bare_marker_frame() {
        let stream = [frame(b""), frame(b"x"), frame(b"")].concat();
        let (frames, _) = assemble(RetainPolicy::LastByte, &stream, &[]);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_bytes(), &FRAME_MARKER[..]);
        assert_eq!(frames[1].as_bytes(), &frame(b"x")[..]);
    }

// # ✅ 2. Split-marker policy

    #[test]
    fn split_marker_is_lost_with_last_byte_policy() {
        // First chunk ends with two marker bytes and holds no full marker.
        let stream = [frame(b"lost-frame"), frame(b"")].concat();
        let (frames, anomalies) = assemble(RetainPolicy::LastByte, &stream, &[2]);

        assert!(frames.is_empty());
        assert_eq!(anomalies[0], FramingAnomaly::NoMarker { discarded: 1 });
    }

    #[test]
    fn split_marker_survives_with_marker_prefix_policy() {
        let stream = [frame(b"kept-frame"), frame(b"")].concat();
        for cut in 1..FRAME_MARKER.len() {
            let (frames, anomalies) = assemble(RetainPolicy::MarkerPrefix, &stream, &[cut]);
            assert_eq!(frames.len(), 1, "cut at {}", cut);
            assert_eq!(frames[0].as_bytes(), &frame(b"kept-frame")[..]);
            assert!(anomalies.is_empty());
        }
    }

    #[test]
    fn noise_only_stream_keeps_policy_tail() {
        let (_, anomalies) = assemble(RetainPolicy::LastByte, b"0123456789", &[3, 6]);
        let discarded: usize = anomalies.iter().map(FramingAnomaly::discarded).sum();
        assert_eq!(discarded, 9);

        let (_, anomalies) = assemble(RetainPolicy::MarkerPrefix, b"0123456789", &[3, 6]);
        let discarded: usize = anomalies.iter().map(FramingAnomaly::discarded).sum();
        assert_eq!(discarded, 7);
    }

// # ✅ 3. Arbitrary splits

    fn body() -> impl Strategy<Value = Vec<u8>> {
        // Printable ASCII never forms a marker.
        proptest::collection::vec(0x20u8..0x7f, 0..64)
    }

    proptest! {
        #[test]
        fn prop_frames_survive_any_split(
            bodies in proptest::collection::vec(body(), 1..8),
            cuts in proptest::collection::vec(any::<usize>(), 0..16),
        ) {
            let mut stream: Vec<u8> = bodies.iter().flat_map(|b| frame(b)).collect();
            stream.extend_from_slice(&FRAME_MARKER);

            let (frames, anomalies) = assemble(RetainPolicy::MarkerPrefix, &stream, &cuts);

            prop_assert_eq!(frames.len(), bodies.len());
            for (got, body) in frames.iter().zip(&bodies) {
                prop_assert_eq!(got.as_bytes(), &frame(body)[..]);
            }
            prop_assert!(anomalies.is_empty());
        }

        #[test]
        fn prop_last_byte_policy_is_lossless_once_first_marker_is_whole(
            bodies in proptest::collection::vec(body(), 1..8),
            cuts in proptest::collection::vec(any::<usize>(), 0..16),
        ) {
            let mut stream: Vec<u8> = bodies.iter().flat_map(|b| frame(b)).collect();
            stream.extend_from_slice(&FRAME_MARKER);
            let len = stream.len();
            let cuts: Vec<usize> = cuts
                .into_iter()
                .map(|c| FRAME_MARKER.len() + c % (len - FRAME_MARKER.len() + 1))
                .collect();

            let (frames, _) = assemble(RetainPolicy::LastByte, &stream, &cuts);

            prop_assert_eq!(frames.len(), bodies.len());
            for (got, body) in frames.iter().zip(&bodies) {
                prop_assert_eq!(got.as_bytes(), &frame(body)[..]);
            }
        }
    }
}
