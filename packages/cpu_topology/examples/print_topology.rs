//! Detects the host topology and prints the diagnostic report.

use cpu_topology::{CpuTopology, TopologyConfig};

fn main() {
    CpuTopology::initialize(&TopologyConfig::default());

    let topology = CpuTopology::current();

    print!("{}", topology.debug_report());

    println!("Usable core IDs: {:?}", topology.usable_core_ids());
    println!(
        "Calling thread is currently on core {}",
        topology.current_core()
    );

    let unsupported = topology.unsupported_instruction_sets_for_build();
    if !unsupported.is_empty() {
        println!("This build assumes instruction sets the host lacks: {unsupported:?}");
    }
}
