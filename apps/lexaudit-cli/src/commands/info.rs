//! System information command

use lexaudit_core::Config;
use lexaudit_platform::{command_available, detect_os, get_system_info};

pub fn run(config: &Config) -> anyhow::Result<()> {
    let sys_info = get_system_info();
    let os_info = detect_os();

    println!("Lexaudit System Information");
    println!("===========================\n");

    println!("Operating System: {} {}", sys_info.os_name, sys_info.os_version);
    println!("Architecture: {}", sys_info.architecture);
    println!("Hostname: {}", sys_info.hostname);

    if let Some(kernel) = &sys_info.kernel_version {
        println!("Kernel: {}", kernel);
    }

    if let Some(distro) = &os_info.distribution {
        println!("Distribution: {}", distro);
    }

    println!("\nPrivileges: {}", if sys_info.is_elevated { "Elevated (root)" } else { "Normal user" });

    println!("\nProbe tools:");
    for tool in ["lsattr", "lsblk", "fdesetup", "ls"] {
        println!(
            "  - {}: {}",
            tool,
            if command_available(tool) { "Available" } else { "Not found" }
        );
    }

    let evaluation = &config.evaluation;
    println!("\nEvidence sources:");
    println!(
        "  - {}: {}",
        evaluation.sshd_config_path.display(),
        if evaluation.sshd_config_path.exists() { "Present" } else { "Missing" }
    );
    for target in &evaluation.log_targets {
        println!(
            "  - {}: {}",
            target.display(),
            if target.exists() { "Present" } else { "Missing" }
        );
    }

    Ok(())
}
