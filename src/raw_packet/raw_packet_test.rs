use super::*;

#[test]
fn test_raw_packet_roundtrip() {
    let tests: Vec<(&str, RawPacket, Option<Error>)> = vec![
        (
            "valid",
            RawPacket(Bytes::from_static(&[
                0x81, 0xcb, 0x00, 0x02, // v=2, p=0, count=1, BYE, len=2
                0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
                0x03, 0x46, 0x4f, 0x4f, // len=3, text=FOO
            ])),
            None,
        ),
        (
            "app",
            RawPacket(Bytes::from_static(&[
                0x80, 0xcc, 0x00, 0x02, // v=2, p=0, subtype=0, APP, len=2
                0x90, 0x2f, 0x9e, 0x2e, // ssrc=0x902f9e2e
                0x6e, 0x61, 0x6d, 0x65, // name=name
            ])),
            None,
        ),
        (
            "short header",
            RawPacket(Bytes::from_static(&[0x80])),
            Some(Error::MalformedHeader),
        ),
        (
            "invalid header",
            RawPacket(
                // v=0, p=0, count=0, RR, len=4
                Bytes::from_static(&[0x00, 0xc9, 0x00, 0x04]),
            ),
            Some(Error::MalformedHeader),
        ),
        (
            "length disagrees with bytes",
            RawPacket(
                // v=2, p=0, count=0, type=250, len=4
                Bytes::from_static(&[0x80, 0xfa, 0x00, 0x04]),
            ),
            Some(Error::InvalidHeader),
        ),
    ];

    for (name, pkt, marshal_error) in tests {
        let result = pkt.marshal();
        assert_eq!(
            result.is_err(),
            marshal_error.is_some(),
            "Marshal {name}: err = {result:?}, want {marshal_error:?}"
        );

        if let Some(err) = marshal_error {
            let got_err = result.err().unwrap();
            assert_eq!(err, got_err, "Marshal {name}: err = {got_err:?}, want {err:?}");
            continue;
        }

        let mut data = result.unwrap();
        let decoded = RawPacket::unmarshal(&mut data)
            .unwrap_or_else(|_| panic!("Unmarshal {name}"));
        assert_eq!(decoded, pkt, "{name} raw round trip: got {decoded:?}, want {pkt:?}");
    }
}

#[test]
fn test_raw_packet_keeps_unknown_type() {
    let mut data = Bytes::from_static(&[
        0x80, 0xfa, 0x00, 0x01, // v=2, p=0, count=0, type=250, len=1
        0xde, 0xad, 0xbe, 0xef, // opaque body
        0x80, 0xc8, 0x00, 0x06, // start of the next sub-packet
    ]);

    let pkt = RawPacket::unmarshal(&mut data).expect("unmarshal");
    assert_eq!(pkt.header().packet_type, PacketType::Unsupported);
    assert_eq!(pkt.packet_type_octet(), 0xfa);
    assert_eq!(&pkt.body()[..], &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(data.len(), 4, "must stop at the declared length");
}

#[test]
fn test_raw_packet_truncated() {
    let mut data = Bytes::from_static(&[
        0x80, 0xfa, 0x00, 0x02, // v=2, p=0, count=0, type=250, len=2
        0xde, 0xad, 0xbe, 0xef,
    ]);

    let got = RawPacket::unmarshal(&mut data);
    assert_eq!(Error::TruncatedBody, got.err().unwrap());
}
