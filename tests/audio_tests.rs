use paud_rs::{
    Audio, AudioInit, DataFrames, Format, Frame, NumericData, NumericType, PaudError, Position,
};

/// Mono 16-bit audio at 10 Hz whose frame `i` holds the value `i`.
fn counting(frames: u16) -> Audio {
    let frames = (0..frames)
        .map(|i| Frame::from_bytes(i.to_le_bytes().to_vec()))
        .collect();
    Audio::with_format(frames, Format::new(1, 2, 10)).unwrap()
}

fn values(audio: &Audio) -> Vec<u128> {
    audio.iter().map(|f| u128::try_from(f.to_integer()).unwrap()).collect()
}

#[test]
fn derived_properties() {
    let audio = counting(25);
    assert_eq!(audio.frame_count(), 25);
    assert_eq!(audio.len(), 25);
    assert_eq!(audio.frame_width(), 2);
    assert_eq!(audio.duration(), 2.5);
    assert_eq!(audio.peak_amplitude(), 32_768.0);

    let params = audio.params();
    assert_eq!(
        (
            params.channels,
            params.sample_width,
            params.frame_rate,
            params.frame_count,
            params.compression_type,
            params.compression_name
        ),
        (1, 2, 10, 25, "NONE", "Uncompressed")
    );
}

#[test]
fn integer_and_timestamp_indexing() {
    let audio = counting(30);
    assert_eq!(audio.get(4).unwrap().to_integer(), 4u32.into());
    assert_eq!(audio.get_at("0:01").unwrap().to_integer(), 10u32.into());
    assert_eq!(audio.get_at("0.25").unwrap().to_integer(), 2u32.into());
    assert_eq!(audio.get_at(Position::Frame(7)).unwrap().to_integer(), 7u32.into());

    assert!(matches!(audio.get(30), Err(PaudError::IndexOutOfRange { index: 30, len: 30 })));
    assert!(matches!(audio.get_at("0:03"), Err(PaudError::IndexOutOfRange { .. })));
    assert!(matches!(audio.get_at("soon"), Err(PaudError::Parse(_))));
}

#[test]
fn slices_keep_format() {
    let audio = counting(30);
    let part = audio.slice(5..8);
    assert_eq!(values(&part), vec![5, 6, 7]);
    assert_eq!(part.format(), audio.format());

    assert_eq!(audio.slice(..).frame_count(), 30);
    assert_eq!(values(&audio.slice(28..)), vec![28, 29]);
    assert_eq!(values(&audio.slice(..=1)), vec![0, 1]);
    assert!(audio.slice(40..50).is_empty());
    let (start, stop) = (9, 3);
    assert!(audio.slice(start..stop).is_empty());
}

#[test]
fn timestamp_slices() {
    let audio = counting(30);
    let part = audio
        .slice_at(Some(Position::Timestamp("0:01")), Some(Position::Timestamp("0:01.3")))
        .unwrap();
    assert_eq!(values(&part), vec![10, 11, 12]);

    let tail = audio.slice_at(Some("0:02".into()), None).unwrap();
    assert_eq!(tail.frame_count(), 10);

    let head = audio.slice_at(None, Some(Position::Frame(3))).unwrap();
    assert_eq!(values(&head), vec![0, 1, 2]);
}

#[test]
fn nested_slices_compose() {
    let eager = counting(20);
    let lazy = eager.to_lazy().unwrap();
    for audio in [&eager, &lazy] {
        for (a, b, c, d) in [(0, 20, 0, 20), (2, 15, 3, 9), (5, 10, 1, 30), (4, 4, 0, 2), (3, 18, 6, 6)] {
            let nested = audio.slice(a..b).slice(c..d);
            let direct = audio.slice(a + c..b.min(a + d));
            assert_eq!(nested, direct, "[{a}:{b}][{c}:{d}]");
        }
    }
}

#[test]
fn lazy_and_eager_compare_equal() {
    let eager = counting(12);
    let lazy = eager.to_lazy().unwrap();
    assert!(lazy.is_lazy());
    assert!(!eager.is_lazy());
    assert_eq!(eager, lazy);
    assert_eq!(lazy.to_eager(), eager);
    assert_eq!(lazy.get(11).unwrap(), eager.get(11).unwrap());
}

#[test]
fn equality_includes_params() {
    let a = counting(4);
    let frames: Vec<Frame> = a.iter().collect();
    let b = Audio::with_format(frames, Format::new(1, 2, 20)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn derived_audio_does_not_alias_source() {
    for source in [counting(6), counting(6).to_lazy().unwrap()] {
        let mut child = source.slice(1..3);
        child.append(Frame::from_bytes(vec![0xAA, 0xAA])).unwrap();
        child.set(0, Frame::from_bytes(vec![0xBB, 0xBB])).unwrap();
        assert_eq!(values(&source), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(values(&child), vec![0xBBBB, 2, 0xAAAA]);
    }
}

#[test]
fn set_rejects_frames_of_the_wrong_width() {
    let mut audio = counting(3);
    assert!(matches!(
        audio.set(0, Frame::from_integer(1u32)),
        Err(PaudError::TypeMismatch(_))
    ));
    assert!(matches!(
        audio.set(3, Frame::from_bytes(vec![0, 0])),
        Err(PaudError::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        audio.append(Frame::from_bytes(vec![1, 2, 3])),
        Err(PaudError::TypeMismatch(_))
    ));
}

#[test]
fn range_assignment() {
    for mut audio in [counting(5), counting(5).to_lazy().unwrap()] {
        let nines = vec![Frame::from_bytes(vec![9, 0]); 3];
        audio.set_range(1..3, nines).unwrap();
        assert_eq!(values(&audio), vec![0, 9, 9, 9, 3, 4]);

        audio.set_range(4.., Vec::new()).unwrap();
        assert_eq!(values(&audio), vec![0, 9, 9, 9]);
    }
}

#[test]
fn extend_is_all_or_nothing() {
    let mut audio = counting(2);
    let result = audio.extend([Frame::from_bytes(vec![5, 0]), Frame::from_integer(6u32)]);
    assert!(result.is_err());
    assert_eq!(audio.frame_count(), 2);

    audio
        .extend([Frame::from_bytes(vec![5, 0]), Frame::from_bytes(vec![6, 0])])
        .unwrap();
    assert_eq!(values(&audio), vec![0, 1, 5, 6]);
}

#[test]
fn max_is_numeric() {
    let frames = vec![
        Frame::from_bytes(vec![0xFF, 0x00]),
        Frame::from_bytes(vec![0x00, 0x01]),
        Frame::from_bytes(vec![0x10, 0x00]),
    ];
    let audio = Audio::with_format(frames, Format::new(1, 2, 8000)).unwrap();
    assert_eq!(audio.max().unwrap(), Frame::from_bytes(vec![0x00, 0x01]));
    assert_eq!(Audio::default().max(), None);
}

#[test]
fn concatenation_keeps_left_format() {
    let left = counting(2);
    let right_frames: Vec<Frame> = counting(3).iter().collect();
    let right = Audio::with_format(right_frames, Format::new(1, 2, 44_100)).unwrap();

    let joined = left.concat(&right).unwrap();
    assert_eq!(values(&joined), vec![0, 1, 0, 1, 2]);
    assert_eq!(joined.format(), left.format());

    let stereo = Frame::from_bytes(vec![0; 4]).repeat(2).unwrap();
    assert!(matches!(left.concat(&stereo), Err(PaudError::TypeMismatch(_))));
}

#[test]
fn lazy_concatenation() {
    let a = counting(3).to_lazy().unwrap();
    let b = counting(2).to_lazy().unwrap();
    let joined = a.concat(&b).unwrap();
    assert!(joined.is_lazy());
    assert_eq!(values(&joined), vec![0, 1, 2, 0, 1]);
    assert_eq!(a.frame_count(), 3);
}

#[test]
fn audio_plus_frame() {
    let audio = counting(2);
    let longer = audio.with_frame(Frame::from_bytes(vec![7, 0])).unwrap();
    assert_eq!(values(&longer), vec![0, 1, 7]);
    assert_eq!(audio.frame_count(), 2);
}

#[test]
fn empty_audio_is_the_additive_identity() {
    let empty = Audio::empty(Format::new(2, 2, 8000)).unwrap();
    let total: paud_rs::Result<Audio> = vec![empty.clone()].into_iter().sum();
    assert_eq!(total.unwrap(), empty);

    let audio = counting(4);
    assert_eq!(audio.concat(&Audio::default()).unwrap(), audio);
    assert_eq!((&audio + &Audio::default()).unwrap(), audio);

    let nothing: paud_rs::Result<Audio> = Vec::<Audio>::new().into_iter().sum();
    assert!(nothing.unwrap().is_empty());
}

#[test]
fn empty_left_side_keeps_its_format() {
    let stereo = Format::new(2, 2, 8000);
    let mono_wide: Vec<Frame> = (0..3u32).map(|i| Frame::from_bytes(i.to_le_bytes())).collect();
    let mono_wide = Audio::with_format(mono_wide, Format::new(1, 4, 44_100)).unwrap();

    for left in [Audio::empty(stereo).unwrap(), Audio::empty(stereo).unwrap().to_lazy().unwrap()] {
        let joined = left.concat(&mono_wide).unwrap();
        assert_eq!(joined.format(), stereo);
        assert_eq!(joined.frame_count(), 3);
        assert_eq!(joined.iter().collect::<Vec<_>>(), mono_wide.iter().collect::<Vec<_>>());
    }

    let default_left = Audio::default().concat(&counting(4)).unwrap();
    assert_eq!(default_left.format(), Format::default());
    assert_eq!(values(&default_left), vec![0, 1, 2, 3]);

    // Widths still have to agree.
    let narrow = Audio::empty(Format::new(1, 1, 8000)).unwrap();
    assert!(matches!(narrow.concat(&counting(2)), Err(PaudError::TypeMismatch(_))));
}

#[test]
fn operators_match_named_methods() {
    let left = counting(2);
    let right = counting(3);
    assert_eq!((&left + &right).unwrap(), left.concat(&right).unwrap());

    let frame = Frame::from_bytes(vec![7, 0]);
    assert_eq!((&left + frame.clone()).unwrap(), left.with_frame(frame).unwrap());
    assert!(matches!(&left + Frame::from_integer(1u32), Err(PaudError::TypeMismatch(_))));
}

#[test]
fn repetition() {
    let audio = counting(2);
    assert_eq!(values(&audio.repeat(3).unwrap()), vec![0, 1, 0, 1, 0, 1]);
    assert_eq!(values(&(&audio.to_lazy().unwrap() * 2).unwrap()), vec![0, 1, 0, 1]);
    assert!(audio.repeat(0).unwrap().is_empty());
    assert!(matches!(audio.repeat(-1), Err(PaudError::InvalidOperand(_))));
}

#[test]
fn oversized_repetition_is_an_error() {
    for audio in [counting(1), counting(1).to_lazy().unwrap()] {
        assert!(matches!(audio.repeat(i64::MAX), Err(PaudError::InvalidOperand(_))));
        assert!(matches!(&audio * usize::MAX, Err(PaudError::InvalidOperand(_))));
        assert_eq!(audio.frame_count(), 1);
    }
}

#[test]
fn empty_requires_a_valid_format() {
    for format in [Format::new(0, 0, 0), Format::new(1, 0, 8000), Format::new(2, 2, 0)] {
        assert!(matches!(
            Audio::empty(format),
            Err(PaudError::InvalidConfiguration(_))
        ));
    }
    let audio = Audio::empty(Format::new(2, 2, 8000)).unwrap();
    let array = audio.to_numeric_array(NumericType::F32).unwrap();
    assert_eq!(array.shape(), (0, 2));
}

#[test]
fn reversal_is_an_involution() {
    for audio in [counting(7), counting(7).to_lazy().unwrap()] {
        let reversed = audio.reversed();
        assert_eq!(values(&reversed), vec![6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(reversed.format(), audio.format());
        assert_eq!(reversed.reversed(), audio);
    }
}

#[test]
fn separate_into_chunks() {
    let audio = counting(10);
    let parts = audio.separate(3).unwrap();
    let sizes: Vec<usize> = parts.iter().map(Audio::frame_count).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert!(parts.iter().all(|p| p.format() == audio.format()));

    let rejoined: paud_rs::Result<Audio> = parts.into_iter().sum();
    assert_eq!(rejoined.unwrap(), audio);

    assert_eq!(audio.separate(20).unwrap().len(), 10);
    assert_eq!(audio.separate(1).unwrap(), vec![audio.clone()]);
    assert!(Audio::default().separate(4).unwrap().is_empty());
    assert!(matches!(audio.separate(0), Err(PaudError::InvalidArgument(_))));
}

#[test]
fn ordering_follows_frames() {
    let low = counting(3);
    let high = counting(4);
    assert!(low < high);
    assert!(high.slice(1..) > low);
}

#[test]
fn construction_modes() {
    let from_buffer = Audio::new(
        AudioInit::FromBuffer {
            data: vec![1, 0, 2, 0, 3, 0, 4, 0],
            frame_width: 4,
        },
        None,
    )
    .unwrap();
    assert!(from_buffer.is_lazy());
    assert_eq!((from_buffer.channels(), from_buffer.sample_width()), (1, 4));
    assert_eq!(from_buffer.frame_count(), 2);

    let stereo = Format::new(2, 2, 8000);
    let with_format = Audio::new(
        AudioInit::FromBuffer {
            data: vec![0; 8],
            frame_width: 4,
        },
        Some(stereo),
    )
    .unwrap();
    assert_eq!(with_format.format(), stereo);

    let mismatch = Audio::new(
        AudioInit::FromBuffer {
            data: vec![0; 8],
            frame_width: 2,
        },
        Some(stereo),
    );
    assert!(matches!(mismatch, Err(PaudError::InvalidConfiguration(_))));

    let empty = Audio::new(AudioInit::FromParams(stereo), None).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.format(), stereo);
    assert!(matches!(
        Audio::new(AudioInit::FromParams(stereo), Some(Format::default())),
        Err(PaudError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        Audio::new(AudioInit::FromParams(Format::new(0, 2, 8000)), None),
        Err(PaudError::InvalidConfiguration(_))
    ));

    let inferred = Audio::new(
        AudioInit::FromFrames(vec![Frame::from_bytes(vec![1, 2, 3]); 2]),
        None,
    )
    .unwrap();
    assert_eq!(inferred.sample_width(), 3);
    assert_eq!(Audio::from_frames(Vec::new()).unwrap().format(), Format::default());
}

#[test]
fn lazy_views_build_from_data_frames() {
    let frames = DataFrames::new(vec![0u8; 12], 4).unwrap();
    let audio = Audio::from_data_frames(frames.clone(), Format::new(2, 2, 8000)).unwrap();
    assert_eq!(audio.frame_count(), 3);
    assert!(Audio::from_data_frames(frames, Format::new(1, 2, 8000)).is_err());
}

#[test]
fn numeric_array_native_and_scaled() {
    // (1, -1) and (-32768, 32767)
    let frames = vec![
        Frame::from_bytes(vec![0x01, 0x00, 0xFF, 0xFF]),
        Frame::from_bytes(vec![0x00, 0x80, 0xFF, 0x7F]),
    ];
    let audio = Audio::with_format(frames, Format::new(2, 2, 8000)).unwrap();

    let native = audio.to_numeric_array(NumericType::Native).unwrap();
    assert_eq!(native.shape(), (2, 2));
    assert_eq!(native.data, NumericData::Int(vec![1, -1, -32_768, 32_767]));

    let narrow = audio.to_numeric_array(NumericType::I8).unwrap();
    assert_eq!(narrow.data, NumericData::Int(vec![0, 0, -128, 127]));

    let wide = audio.to_numeric_array(NumericType::I32).unwrap();
    assert_eq!(
        wide.data,
        NumericData::Int(vec![65_536, -65_536, -2_147_483_648, 2_147_418_112])
    );

    let float = audio.to_numeric_array(NumericType::F64).unwrap();
    assert_eq!(
        float.data,
        NumericData::F64(vec![1.0 / 32_768.0, -1.0 / 32_768.0, -1.0, 32_767.0 / 32_768.0])
    );

    let single = audio.to_numeric_array(NumericType::F32).unwrap();
    match single.data {
        NumericData::F32(samples) => assert_eq!(samples[2], -1.0),
        other => panic!("expected f32 samples, got {other:?}"),
    }
}

#[test]
fn numeric_array_rejects_oversized_samples() {
    let audio = Frame::from_bytes(vec![0; 9]).repeat(1).unwrap();
    assert!(matches!(
        audio.to_numeric_array(NumericType::Native),
        Err(PaudError::UnsupportedFormat(_))
    ));
}
