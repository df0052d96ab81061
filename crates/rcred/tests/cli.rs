use rcred_test_utils::sandbox::Sandbox;

const PI_DECK: &str = "\
* extracted wire
V1 drv 0 DC 1
C1 a 0 1p
R1 a b 0
C2 b 0 1p
R2 b c 50
C3 c 0 4p
.end
";

const THREE_STAGE: &str = "\
* three-stage ladder
C1 n0 0 1p
R1 n0 n1 10
C2 n1 0 2p
R2 n1 n2 20
C3 n2 0 3p
R3 n2 n3 30
C4 n3 0 4p
.end
";

#[test]
fn test_moments() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", "C1 a 0 1p\nR1 a b 10\nC2 b 0 1p\nR9 b\n");
    let out = sb.capture("rcred", ["moments", "net.sp"]);
    assert!(out.success(), "{}", out.stderr);
    insta::assert_snapshot!(out.stdout, @r"
    y1=2e-12
    y2=-1e-23
    y3=1e-34
    y4=-1e-45
    y5=1e-56
    skipped=1
    ");
    assert!(out.stderr.contains("line 4"));
}

#[test]
fn test_reduce_exact_pi_splices_netlist() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", PI_DECK);
    let out = sb.capture(
        "rcred",
        [
            "reduce", "net.sp", "--model", "pi", "-o", "out.sp", "--report", "report.txt",
        ],
    );
    assert!(out.success(), "{}", out.stderr);
    insta::assert_snapshot!(sb.read("out.sp"), @r"
    * extracted wire
    V1 drv 0 DC 1
    Cred1 a 0 2e-12
    Rred1 a a_1 50
    Cred2 a_1 0 4e-12
    .end
    ");

    let report = sb.read("report.txt");
    assert!(report.contains("model=pi\n"));
    assert!(report.contains("provenance=exact\n"));
    assert!(report.contains("skipped=0\n"));
}

#[test]
fn test_reduce_leaves_records_after_block() {
    let mut sb = Sandbox::new();
    sb.write(
        "net.sp",
        "C1 a 0 1p\nR1 a b 10\nC2 b 0 1p\n* far section\nR2 b c 20\nC3 c 0 1p\n",
    );
    let out = sb.capture("rcred", ["reduce", "net.sp", "--model", "pi"]);
    assert!(out.success(), "{}", out.stderr);
    insta::assert_snapshot!(out.stdout, @r"
    Cred1 a 0 1e-12
    Rred1 a a_1 10
    Cred2 a_1 0 1e-12
    * far section
    R2 b c 20
    C3 c 0 1p
    ");
    assert!(out.stderr.contains("2 R/C record(s) outside lines 1-3"));
    assert!(out.stderr.contains("y1=2e-12\n"));
    assert!(out.stderr.contains("provenance=exact\n"));
}

#[test]
fn test_reduce_fits_three_stage_ladder() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE);
    let out = sb.capture("rcred", ["reduce", "net.sp"]);
    assert!(out.success(), "{}", out.stderr);
    assert!(out.stdout.starts_with("* three-stage ladder\nCred1 n0 0 "));
    assert!(out.stdout.contains("Rred2 n0_1 n0_2 "));
    assert!(out.stdout.ends_with(".end\n"));
    assert!(out.stderr.contains("model=double-pi\n"));
    assert!(out.stderr.contains("provenance=fitted\n"));
    assert!(out.stderr.contains("used_fallback=false\n"));
    assert!(out.stderr.contains("elmore=1.35e-09\n"));
}

#[test]
fn test_reduce_arrays() {
    let sb = Sandbox::new();
    let out = sb.capture("rcred", ["reduce", "--rs", "10,20,30", "--cs", "1p,2p,3p,4p"]);
    assert!(out.success(), "{}", out.stderr);
    let records: Vec<&str> = out.stdout.lines().collect();
    assert_eq!(records.len(), 5);
    assert!(records[0].starts_with("Cred1 n0 0 "));
    assert!(records[1].starts_with("Rred1 n0 n1 "));
    assert!(records[4].starts_with("Cred3 n2 0 "));
    assert!(out.stderr.contains("provenance=fitted\n"));
    assert!(!out.stderr.contains("skipped="));
}

#[test]
fn test_reduce_positional_exact() {
    let sb = Sandbox::new();
    let out = sb.capture(
        "rcred",
        ["reduce", "--rs", "0,15,0,25", "--cs", "1p,1p,2p,2p,3p,3p"],
    );
    assert!(out.success(), "{}", out.stderr);
    assert!(out.stderr.contains("provenance=exact\n"));
    assert!(out.stdout.contains("Rred1 n0 n1 15\n"));
    assert!(out.stdout.contains("Rred2 n1 n2 25\n"));
}

#[test]
fn test_config_selects_model() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE)
        .write("rcred.toml", "[reduce]\nmodel = \"pi\"\n");
    let out = sb.capture("rcred", ["reduce", "net.sp"]);
    assert!(out.success(), "{}", out.stderr);
    assert!(out.stderr.contains("model=pi\n"));

    let out = sb.capture("rcred", ["reduce", "net.sp", "--model", "double-pi"]);
    assert!(out.stderr.contains("model=double-pi\n"));
}

#[test]
fn test_bad_config_is_fatal() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE)
        .write("custom.toml", "[deck]\nvoltage = 3\n");
    let out = sb.capture("rcred", ["--config", "custom.toml", "moments", "net.sp"]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("Failed to parse config"));
}

#[test]
fn test_missing_netlist() {
    let sb = Sandbox::new();
    let out = sb.capture("rcred", ["reduce", "absent.sp"]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("Error:"));
    assert!(out.stderr.contains("Failed to read netlist"));
}

#[test]
fn test_netlist_without_rc_records() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", "* nothing\nV1 a 0 1\n.end\n");
    let out = sb.capture("rcred", ["reduce", "net.sp"]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("No resistor or capacitor records"));
}

#[test]
fn test_sim_deck_to_stdout() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE);
    let deck = sb
        .run("rcred", ["sim", "net.sp", "--netlist", "--vdd", "1.8"])
        .unwrap();
    assert!(deck.contains(".param VDD=1.8\n"));
    assert!(deck.contains("RDRV_G in g_n0 100\n"));
    assert!(deck.contains("RDRV_P in np0 100\n"));
    assert!(deck.contains("TARG v(g_n3)"));
    assert!(deck.contains("TARG v(np2)"));
    assert!(deck.ends_with(".end\n"));
}

#[test]
fn test_sim_deck_to_file_uses_config() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE)
        .write("rcred.toml", "[deck]\nrdrv = 50\ntstop = \"4n\"\n");
    let out = sb.capture("rcred", ["sim", "net.sp", "-o", "deck.cir"]);
    assert!(out.success(), "{}", out.stderr);
    let deck = sb.read("deck.cir");
    assert!(deck.contains("RDRV_G in g_n0 50\n"));
    assert!(deck.contains(".tran 1p 4n\n"));
}

#[test]
fn test_sim_without_ngspice() {
    let mut sb = Sandbox::new();
    sb.write("net.sp", THREE_STAGE)
        .env("NGSPICE", "/nowhere/ngspice");
    let out = sb.capture("rcred", ["sim", "net.sp"]);
    assert_eq!(out.code, Some(1));
    assert!(out.stderr.contains("ngspice not found"));
}
