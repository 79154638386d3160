use gcrfdc::prelude::*;

mod common;
use common::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn start_write(fdc: &mut FloppyController<EdgeLog>, data: u8) {
    fdc.write(Register::WriteData, data, Time::ZERO);
    fdc.set_line(ControlLine::WriteGate, true, Time::ZERO);
    fdc.write(Register::Spindle, SpindlePort::START0.bits(), Time::ZERO);
}

#[test]
fn test_write_a5() {
    init();

    let mut fdc = controller(64);
    fdc.insert_medium(0, Box::new(MemoryDisk::new(80, 2)), Time::ZERO)
        .unwrap();
    start_write(&mut fdc, 0xA5);

    let t = cells(10);
    run_until(&mut fdc, t);
    fdc.set_line(ControlLine::WriteGate, false, t);

    // 0xA5 encodes to 11010 01111.
    let expected: Vec<u64> = [1, 2, 4, 7, 8, 9, 10].iter().map(|&n| cell_mid(n).as_nanos()).collect();
    assert_eq!(memory_track(&fdc, 0, 0, 0), expected);

    assert_eq!(
        edges_between(fdc.signals().edges(), StatusLine::ByteReady, Time::ZERO, t),
        vec![(t, true)]
    );
    assert_eq!(fdc.checkpoint_state().shift_register(), 0b11010_01111);
}

#[test]
fn test_write_flushed_on_stop() {
    init();

    let stop = ns_after(cells(15), 100);
    let (_, commits) = run_write_scenario(64, stop);

    assert!(!commits.is_empty());
    assert_eq!(commits[0].0, Time::ZERO);
    for pair in commits.windows(2) {
        assert_eq!(pair[0].1, pair[1].0, "commits must be contiguous");
    }
    // The partial cell in progress at the stop is not written.
    assert_eq!(commits.last().map(|commit| commit.1), Some(cells(15)));

    let transitions: Vec<Time> = commits.iter().flat_map(|commit| commit.2.iter().copied()).collect();
    // 0xA5 then 0x00 (01010 01010).
    let expected: Vec<Time> = [1, 2, 4, 7, 8, 9, 10, 12, 14].iter().map(|&n| cell_mid(n)).collect();
    assert_eq!(transitions, expected);

    for (from, to, transitions) in &commits {
        assert!(transitions.iter().all(|t| t > from && t <= to));
    }
}

#[test]
fn test_write_stops_engine() {
    init();

    let mut fdc = controller(64);
    fdc.insert_medium(0, Box::new(RecordingMedium::default()), Time::ZERO)
        .unwrap();
    start_write(&mut fdc, 0x5A);

    let stop = ns_after(cells(23), 700);
    run_until(&mut fdc, stop);
    fdc.write(Register::Spindle, SpindlePort::STOP0.bits(), stop);

    assert_eq!(fdc.live().stage(), LiveStage::Idle);
    assert_eq!(fdc.live().write_start_time(), None);
    assert!(fdc.live().pending_writes().is_empty());
    assert_eq!(fdc.next_wakeup(), None);
    assert_eq!(recorded_commits(&fdc, 0).last().map(|commit| commit.1), Some(cells(23)));
}

#[test]
fn test_write_protected_medium() {
    init();

    let mut fdc = controller(64);
    let disk = MemoryDisk::new(80, 2).with_write_protect(true);
    fdc.insert_medium(0, Box::new(disk), Time::ZERO).unwrap();

    let control = DriveControlPort::from_bits_truncate(fdc.read(Register::DriveControl, Time::ZERO));
    assert!(control.contains(DriveControlPort::WRITE_PROTECT));

    start_write(&mut fdc, 0xA5);
    let t = cells(30);
    run_until(&mut fdc, t);
    fdc.set_line(ControlLine::WriteGate, false, t);

    assert!(memory_track(&fdc, 0, 0, 0).is_empty());
}

#[test]
fn test_write_sync_mark() {
    init();

    let mut fdc = controller(64);
    fdc.insert_medium(0, Box::new(MemoryDisk::new(80, 2)), Time::ZERO)
        .unwrap();
    fdc.set_line(ControlLine::WriteSync, true, Time::ZERO);
    start_write(&mut fdc, 0x00);

    let t = cells(20);
    run_until(&mut fdc, t);
    fdc.set_line(ControlLine::WriteGate, false, t);

    let expected: Vec<u64> = (1..=20).map(|n| cell_mid(n).as_nanos()).collect();
    assert_eq!(memory_track(&fdc, 0, 0, 0), expected);
}

#[test]
fn test_erase_clears_flux() {
    init();

    let bits = sync_track(LEAD, &DATA);
    let mut fdc = controller(64);
    fdc.insert_medium(0, Box::new(disk_with_track(&bits)), Time::ZERO)
        .unwrap();
    fdc.set_line(ControlLine::EraseGate, true, Time::ZERO);
    start_write(&mut fdc, 0xFF);

    let t = cells(100);
    run_until(&mut fdc, t);
    fdc.set_line(ControlLine::WriteGate, false, t);

    // Everything up to cell 100 is gone; the rest of the track is untouched.
    let track = memory_track(&fdc, 0, 0, 0);
    assert!(!track.is_empty());
    assert!(track.iter().all(|&offset| offset > t.as_nanos()));
}

#[test]
fn test_read_back_after_write() {
    init();

    let mut fdc = controller(64);
    let disk = disk_with_track(&sync_track(LEAD, &[]));
    fdc.insert_medium(0, Box::new(disk), Time::ZERO).unwrap();

    // Overwrite the data area following the sync mark with two bytes.
    let start = cells(LEAD + 10);
    fdc.write(Register::Spindle, SpindlePort::START0.bits(), Time::ZERO);
    run_until(&mut fdc, start);
    fdc.write(Register::WriteData, 0x07, start);
    fdc.set_line(ControlLine::WriteGate, true, start);
    fdc.write(Register::WriteData, 0x3C, start);

    let end = cells(LEAD + 30);
    run_until(&mut fdc, end);
    fdc.set_line(ControlLine::WriteGate, false, end);
    fdc.write(Register::Spindle, SpindlePort::STOP0.bits(), end);

    // Read the track back on a fresh controller.
    let medium = fdc.eject(0, end).unwrap().unwrap();
    let mut reader = controller(64);
    reader.insert_medium(0, medium, Time::ZERO).unwrap();
    reader.write(Register::Spindle, SpindlePort::START0.bits(), Time::ZERO);

    let mut bytes = Vec::new();
    for n in 1..=2 {
        let t = ns_after(cells(LEAD + 10 + 10 * n), 100);
        run_until(&mut reader, t);
        bytes.push(reader.read(Register::ReadData, t));
    }
    assert_eq!(bytes, vec![0x07, 0x3C]);
}
