use std::collections::HashSet;
use std::sync::LazyLock;

/// Every command the `can-utils` container is allowed to run, with a short
/// description of what the utility does.
pub const COMMANDS: &[(&str, &str)] = &[
    // Basic tools
    ("cansniffer", "display CAN data content differences"),
    ("candump", "display, filter and log CAN data to files"),
    ("cansend", "send a single frame"),
    ("cangen", "generate (random) CAN traffic"),
    (
        "cansequence",
        "send and check sequence of CAN frames with incrementing payload",
    ),
    ("canplayer", "replay CAN logfiles"),
    // Gateway and remote access
    ("canlogserver", "log CAN frames from a remote/local host"),
    ("bcmserver", "interactive BCM configuration (remote/local)"),
    ("socketcand", "use RAW/BCM/ISO-TP sockets via TCP/IP sockets"),
    ("cannelloni", "UDP/SCTP based SocketCAN tunnel"),
    ("cangw", "CAN gateway userspace tool for netlink configuration"),
    // Measurement and bit timing
    ("canbusload", "calculate and display the CAN busload"),
    (
        "can-calc-bit-timing",
        "userspace version of in-kernel bitrate calculation",
    ),
    ("canfdtest", "full-duplex test program (DUT and host part)"),
    // ISO-TP
    ("isotpdump", "'wiretap' and interpret CAN messages (CAN_RAW)"),
    ("isotpperf", "ISO15765-2 protocol performance visualisation"),
    ("isotprecv", "receive ISO-TP PDU(s)"),
    ("isotpsend", "send a single ISO-TP PDU"),
    ("isotpsniffer", "'wiretap' ISO-TP PDU(s)"),
    (
        "isotpserver",
        "IP server for simple TCP/IP <-> ISO 15765-2 bridging (ASCII HEX)",
    ),
    ("isotptun", "create a bi-directional IP tunnel on CAN via ISO-TP"),
    // J1939
    ("j1939acd", "address claim daemon"),
    ("j1939cat", "take a file and send and receive it over CAN"),
    ("j1939spy", "spy on J1939 messages using SOC_J1939"),
    ("j1939sr", "send/recv from stdin or to stdout"),
    ("testj1939", "send/receive test packet"),
    // Log file conversion
    ("asc2log", "convert ASC logfile to compact CAN frame logfile"),
    ("log2asc", "convert compact CAN frame logfile to ASC logfile"),
    (
        "log2long",
        "convert compact CAN frame representation into user readable",
    ),
    // Serial line CAN
    (
        "slcan_attach",
        "userspace tool for serial line CAN interface configuration",
    ),
    ("slcand", "daemon for serial line CAN interface configuration"),
    (
        "slcanpty",
        "creates a pty for applications using the slcan ASCII protocol",
    ),
    // Container sanity check
    ("whoami", "print the effective user inside the container"),
];

static VALID: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| COMMANDS.iter().map(|(name, _)| *name).collect());

/// Exact, case-sensitive membership test against [`COMMANDS`].
pub fn is_valid(name: &str) -> bool {
    VALID.contains(name)
}

pub fn describe(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, description)| *description)
}
