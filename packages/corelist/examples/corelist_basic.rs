//! Parsing a core list string and emitting it back to the terminal.

fn main() {
    let cores = corelist::parse("0-9,32-35,40");
    assert_eq!(
        cores.values(),
        &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 32, 33, 34, 35, 40]
    );
    assert_eq!(cores.skipped(), 0);

    println!("Named cores: {:?}", cores.values());
    println!("As core list: {}", corelist::emit(cores.values().iter().copied()));
}
