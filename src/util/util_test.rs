use super::*;

#[test]
fn test_get_padding_size() {
    let tests = vec![(0, 0), (1, 3), (2, 2), (3, 1), (4, 0), (100, 0), (500, 0)];

    for (n, p) in tests {
        assert_eq!(
            get_padding_size(n),
            p,
            "Test case returned wrong value for input {n}"
        );
    }
}

#[test]
fn test_put_padding() {
    let mut buf = vec![0xffu8; 3];
    put_padding(&mut buf, 5);
    assert_eq!(buf, vec![0x00, 0x00, 0x03]);

    let mut buf = vec![0xffu8; 3];
    put_zero_padding(&mut buf, 6);
    assert_eq!(buf, vec![0x00, 0x00, 0xff]);
}

#[test]
fn test_24bits_signed() {
    let tests = vec![
        ("zero", [0x00, 0x00, 0x00], 0),
        ("one", [0x00, 0x00, 0x01], 1),
        ("minus one", [0xff, 0xff, 0xff], -1),
        ("max", [0x7f, 0xff, 0xff], 0x7f_ffff),
        ("min", [0x80, 0x00, 0x00], -0x80_0000),
        ("minus two", [0xff, 0xff, 0xfe], -2),
    ];

    for (name, raw, want) in tests {
        let got = get_24bits_signed(raw);
        assert_eq!(got, want, "{name}: decode got {got}, want {want}");
        assert_eq!(put_24bits_signed(want), raw, "{name}: encode");
    }
}
