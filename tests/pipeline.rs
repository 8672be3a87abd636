//! End-to-end mixer and packetizer behaviour

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lan_audio_packetizer::audio::{
    clamp_sample, source_handle, BufferPool, Frame, Mixer, Packetizer, Sample, Source,
};
use lan_audio_packetizer::codec::PcmEncoder;
use lan_audio_packetizer::config::PacketizerConfig;
use lan_audio_packetizer::packet::{
    ChannelWriter, ComposingWriter, Packet, PacketPool, RtpComposer, CHANNEL_MASK_STEREO,
    RTP_HEADER_SIZE,
};

/// Replays a fixed sample array on every read
struct FixedSource {
    samples: Vec<Sample>,
}

impl Source for FixedSource {
    fn read(&mut self, frame: &mut Frame<'_>) {
        frame.samples_mut().copy_from_slice(&self.samples);
    }
}

fn stereo_config() -> PacketizerConfig {
    PacketizerConfig {
        channels: CHANNEL_MASK_STEREO,
        packet_length_ms: 10.0,
        sample_rate: 1000,
        payload_type: 10,
    }
}

fn collecting_packetizer(seed: u64) -> Packetizer<Vec<Packet>, RtpComposer, PcmEncoder> {
    Packetizer::new(
        Vec::new(),
        RtpComposer::new(),
        PcmEncoder::new(CHANNEL_MASK_STEREO),
        PacketPool::new(1024),
        BufferPool::new(128, 1024),
        &stereo_config(),
        &mut StdRng::seed_from_u64(seed),
    )
    .unwrap()
}

/// Real samples per channel carried by a PCM stereo packet
fn real_samples(packet: &Packet) -> u32 {
    (packet.payload().len() / 4) as u32
}

#[test]
fn test_stereo_scenario_three_packets() {
    let (writer, rx) = ChannelWriter::bounded(16);
    let mut packetizer = Packetizer::new(
        writer,
        RtpComposer::new(),
        PcmEncoder::new(CHANNEL_MASK_STEREO),
        PacketPool::new(16),
        BufferPool::new(128, 16),
        &stereo_config(),
        &mut StdRng::seed_from_u64(42),
    )
    .unwrap();
    assert_eq!(packetizer.samples_per_packet(), 10);

    let mut first = vec![0.5; 30];
    let mut second = vec![-0.5; 20];
    packetizer.write(&Frame::new(&mut first));
    packetizer.write(&Frame::new(&mut second));
    assert_eq!(rx.len(), 2);

    packetizer.flush();
    let packets: Vec<Packet> = rx.try_iter().collect();
    assert_eq!(packets.len(), 3);

    let n = packets[0].rtp().unwrap().seqnum;
    let seqnums: Vec<u16> = packets.iter().map(|p| p.rtp().unwrap().seqnum).collect();
    assert_eq!(
        seqnums,
        vec![n, n.wrapping_add(1), n.wrapping_add(2)]
    );

    let deltas: Vec<u32> = packets
        .iter()
        .map(|p| p.rtp().unwrap().timestamp)
        .chain(std::iter::once(packetizer.next_timestamp()))
        .collect::<Vec<_>>()
        .windows(2)
        .map(|w| w[1].wrapping_sub(w[0]))
        .collect();
    assert_eq!(deltas, vec![10, 10, 5]);

    for packet in &packets {
        assert_eq!(packet.body_len(), packetizer.payload_size());
    }
    assert_eq!(real_samples(&packets[2]), 5);
    assert_eq!(packets[2].padding_len(), 20);
}

#[test]
fn test_random_state_is_reproducible() {
    let a = collecting_packetizer(7);
    let b = collecting_packetizer(7);
    let c = collecting_packetizer(8);

    assert_eq!(a.source_id(), b.source_id());
    assert_eq!(a.next_seqnum(), b.next_seqnum());
    assert_eq!(a.next_timestamp(), b.next_timestamp());
    assert_ne!(
        (a.source_id(), a.next_timestamp()),
        (c.source_id(), c.next_timestamp())
    );
}

#[test]
fn test_mixer_into_packetizer() {
    let sample_pool: BufferPool<Sample> = BufferPool::new(64, 1);
    let mut mixer = Mixer::new(&sample_pool);
    mixer.add(source_handle(FixedSource {
        samples: vec![0.25; 20],
    }));
    mixer.add(source_handle(FixedSource {
        samples: vec![0.25; 20],
    }));

    let mut packetizer = Packetizer::new(
        ComposingWriter::new(Vec::<Packet>::new()),
        RtpComposer::new(),
        PcmEncoder::new(CHANNEL_MASK_STEREO),
        PacketPool::new(4),
        BufferPool::new(128, 4),
        &stereo_config(),
        &mut StdRng::seed_from_u64(1),
    )
    .unwrap();

    let mut buf = vec![0.0; 20];
    let mut frame = Frame::new(&mut buf);
    mixer.read(&mut frame);
    packetizer.write(&frame);

    let packets = packetizer.writer().inner();
    assert_eq!(packets.len(), 1);

    let packet = &packets[0];
    let header = &packet.data()[..RTP_HEADER_SIZE];
    assert_eq!(header[0], 0x80);
    assert_eq!(header[1], 10);
    assert_eq!(
        u32::from_be_bytes([header[8], header[9], header[10], header[11]]),
        packetizer.source_id()
    );

    // 0.5 * 32767 rounded
    for pair in packet.payload().chunks(2) {
        assert_eq!(i16::from_be_bytes([pair[0], pair[1]]), 16384);
    }
}

#[test]
fn test_packets_return_to_pools() {
    let packet_pool = PacketPool::new(4);
    let buffer_pool: BufferPool<u8> = BufferPool::new(128, 4);
    let (writer, rx) = ChannelWriter::bounded(16);
    let mut packetizer = Packetizer::new(
        writer,
        RtpComposer::new(),
        PcmEncoder::new(CHANNEL_MASK_STEREO),
        packet_pool.clone(),
        buffer_pool.clone(),
        &stereo_config(),
        &mut StdRng::seed_from_u64(3),
    )
    .unwrap();

    let mut data = vec![0.0; 60];
    packetizer.write(&Frame::new(&mut data));
    assert_eq!(rx.len(), 3);
    assert_eq!(packet_pool.in_use(), 3);
    assert_eq!(buffer_pool.in_use(), 3);

    drop(rx.try_iter().collect::<Vec<_>>());
    assert_eq!(packet_pool.in_use(), 0);
    assert_eq!(buffer_pool.in_use(), 0);
}

proptest! {
    #[test]
    fn prop_mixer_output_is_saturated_sum(
        inputs in prop::collection::vec(
            prop::collection::vec(-1.0f32..=1.0, 12),
            0..6,
        )
    ) {
        let pool: BufferPool<Sample> = BufferPool::new(12, 1);
        let mut mixer = Mixer::new(&pool);
        for samples in &inputs {
            mixer.add(source_handle(FixedSource { samples: samples.clone() }));
        }

        let mut out = vec![0.0; 12];
        mixer.read(&mut Frame::new(&mut out));

        for (i, &actual) in out.iter().enumerate() {
            let sum = inputs.iter().fold(0.0f32, |acc, s| acc + s[i]);
            prop_assert_eq!(actual, clamp_sample(sum));
        }
    }

    #[test]
    fn prop_packets_are_contiguous(
        seed in any::<u64>(),
        chunks in prop::collection::vec(0usize..40, 1..20),
    ) {
        let mut packetizer = collecting_packetizer(seed);
        let start_seqnum = packetizer.next_seqnum();
        let start_timestamp = packetizer.next_timestamp();

        let mut total = 0u32;
        for pairs in &chunks {
            let mut data = vec![0.1; pairs * 2];
            packetizer.write(&Frame::new(&mut data));
            total += *pairs as u32;
        }
        packetizer.flush();

        let packets = packetizer.writer();
        let mut seqnum = start_seqnum;
        let mut timestamp = start_timestamp;
        let mut carried = 0u32;

        for (i, packet) in packets.iter().enumerate() {
            let rtp = packet.rtp().unwrap();
            prop_assert_eq!(rtp.seqnum, seqnum);
            prop_assert_eq!(rtp.timestamp, timestamp);
            prop_assert_eq!(packet.body_len(), packetizer.payload_size());

            let real = real_samples(packet);
            if i + 1 < packets.len() {
                prop_assert_eq!(real, 10);
            } else {
                prop_assert!(real > 0 && real <= 10);
            }

            seqnum = seqnum.wrapping_add(1);
            timestamp = timestamp.wrapping_add(real);
            carried += real;
        }

        prop_assert_eq!(carried, total);
        prop_assert_eq!(packetizer.next_seqnum(), seqnum);
        prop_assert_eq!(packetizer.next_timestamp(), timestamp);
        prop_assert!(!packetizer.has_pending());
    }
}
