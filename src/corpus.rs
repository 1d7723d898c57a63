// Copyright (c) 2026 rezky_nightky

//! Built-in scripts and command corpus for the boot feeds.

pub const BOOT_STEPS: &[&str] = &[
    "> INITIALIZING COSMIC SYSTEMS...",
    "> LOADING NEURAL PATHWAYS...",
    "> CONNECTING TO UNIVERSAL GRID...",
    "> CALIBRATING QUANTUM PROCESSORS...",
    "> MOUNTING CONSCIOUSNESS FILESYSTEM...",
    "> ESTABLISHING DIMENSIONAL LINKS...",
    "> SYNCHRONIZING REALITY MATRICES...",
    "> ACTIVATING GALAXY BRAIN PROTOCOL...",
    "> READY TO LAUNCH.",
];

pub const LOADING_SEQUENCE: &[&str] = &[
    "LOADING CONSCIOUSNESS MATRIX v3.14159...",
    "ESTABLISHING SECURE DIMENSIONAL GATEWAY...",
    "DECRYPTING SYNAPTIC PATHWAYS...",
    "BOOTING DIGITAL SUBCONSCIOUS...",
    "CALIBRATING REALITY DISTORTION FIELD...",
    "SYNCHRONIZING TEMPORAL FLUX CAPACITOR...",
    "ACTIVATING HACKER PROTOCOLS...",
    "INJECTING QUANTUM CODE SEQUENCES...",
    "BYPASSING UNIVERSAL FIREWALLS...",
    "EXPLOITING CONSCIOUSNESS VULNERABILITIES...",
    "ESCALATING PRIVILEGES TO ROOT@UNIVERSE...",
    "MOUNTING NEURAL FILESYSTEM...",
    "CRACKING ENCRYPTION ON REALITY.EXE...",
    "ESTABLISHING BACKDOOR TO ENLIGHTENMENT...",
    "PREPARING DIMENSIONAL JOURNEY...",
];

pub const COMMANDS: &[&str] = &[
    // infiltration
    "ssh root@matrix.neo.local -p 2077",
    "nmap -sS -O target.consciousness.net",
    "hydra -l admin -P /usr/share/wordlists/rockyou.txt ssh://reality.exe",
    "sqlmap -u 'https://brain.local/login' --dbs",
    "msfconsole -q -x 'use exploit/multi/handler'",
    "nc -lvp 4444 # Listening for reverse shell",
    r#"python3 -c "import pty; pty.spawn('/bin/bash')""#,
    "find / -perm -4000 -type f 2>/dev/null",
    "cat /etc/passwd | grep -E '^[^:]*:[^:]*:0:'",
    "ps aux | grep -i consciousness",
    // injection
    "import consciousness from 'digital_realm'",
    "curl -X POST https://matrix.net/redpill -H 'X-Reality: false'",
    "echo 'I am the one' > /dev/null 2>&1",
    "def neural_hack(): return matrix.decode(quantum_state)",
    "sudo rm -rf /limitations/* --no-preserve-root",
    "git commit -m 'reality.exe has stopped working' --allow-empty",
    "docker run -d --privileged --name reality universe:latest",
    "kubectl apply -f consciousness-deployment.yaml",
    "terraform apply -var='reality=false' -auto-approve",
    "ansible-playbook -i hosts enlightenment.yml",
    // network and crypto
    "openssl genrsa -out private_key.pem 4096",
    "gpg --gen-key --batch --passphrase 'transcendence'",
    "hashcat -m 1000 -a 0 hashes.txt wordlist.txt",
    "john --wordlist=/usr/share/wordlists/rockyou.txt shadow",
    "aircrack-ng -w wordlist.txt -b 00:11:22:33:44:55 capture.cap",
    "ettercap -T -M arp:remote /192.168.1.1// /192.168.1.100//",
    "wireshark -i eth0 -k -f 'tcp port 443'",
    "ncat --ssl -l 443 --sh-exec 'cat /etc/passwd'",
    "socat TCP-LISTEN:8080,fork TCP:target.local:80",
    "proxychains nmap -sT -Pn target.internal",
    // system
    "echo 0 > /proc/sys/kernel/randomize_va_space",
    "sysctl -w net.ipv4.ip_forward=1",
    "iptables -t nat -A POSTROUTING -o eth0 -j MASQUERADE",
    "mount -t tmpfs -o size=1G tmpfs /tmp/ramdisk",
    "chroot /mnt/target /bin/bash",
    "strace -p $(pgrep consciousness) -o trace.log",
    "gdb -p $(pgrep reality) -batch -ex 'bt' -ex 'quit'",
    "ltrace ./consciousness 2>&1 | grep -i password",
    "objdump -d ./reality | grep -A 10 -B 10 'call.*system'",
    r"strings /usr/bin/consciousness | grep -i 'password\|key\|secret'",
    // toolchains
    "python3 neural_network_init.py --dimensions=infinite --reality=false",
    "cargo build --release --features=multidimensional,quantum",
    "go run main.go --mode=transcendent --debug=false --reality=optional",
    "rustc --edition=2024 cosmic_brain.rs -o enlightenment.exe",
    "node server.js --port=∞ --host=0.0.0.0 --reality=simulation",
    "pip install tensorflow-quantum numpy-cosmic consciousness-api",
    "npm install @cosmic/brain-interface@latest --save-dev",
    "gem install reality-distortion-field",
    "composer require universe/consciousness:^∞.0",
    "yarn add @quantum/entanglement @cosmic/awareness",
    // filesystem
    "dd if=/dev/zero of=/dev/reality bs=1M count=1024",
    "rsync -avz --progress /consciousness/ backup@remote:/quantum/",
    "tar -czf consciousness_backup.tar.gz /var/lib/consciousness/",
    r"find /reality -name '*.truth' -exec shred -vfz -n 3 {} \;",
    "grep -r 'meaning_of_life' /universe/ --include='*.py'",
    r#"awk '{sum+=$1} END {print "Total consciousness:", sum}' /proc/awareness"#,
    "sed -i 's/reality/simulation/g' /etc/universe.conf",
    "sort /var/log/cosmic_events.log | uniq -c | sort -nr",
    r"head -n 42 /dev/urandom | base64 | tr -d '\n'",
    "tail -f /var/log/enlightenment.log | grep -i 'transcendence'",
];

pub const PROGRESS_PHASES: &[&str] = &[
    "INITIALIZING",
    "LOADING NEURAL NETWORKS",
    "CALIBRATING QUANTUM PROCESSORS",
    "ESTABLISHING COSMIC CONNECTION",
    "SYNCHRONIZING DIMENSIONS",
    "ACTIVATING CONSCIOUSNESS MATRIX",
    "READY FOR TRANSCENDENCE",
];

pub const HEADER: &str = "[SYSTEM] Initializing Galaxy Brain Terminal v2.1.337";
pub const FOOTER_PROMPT: &str = "$ INJECTING QUANTUM CODE SEQUENCES...";

/// Load the script at `path`, one line per entry, blank lines skipped.
pub fn load_script(path: &std::path::Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect())
}

pub fn owned(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpora_are_populated() {
        assert_eq!(BOOT_STEPS.len(), 9);
        assert_eq!(LOADING_SEQUENCE.len(), 15);
        assert_eq!(COMMANDS.len(), 60);
        assert_eq!(PROGRESS_PHASES.len(), 7);
        assert!(COMMANDS.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn load_script_skips_blank_lines() {
        let dir = std::env::temp_dir().join(format!("cosmoboot-script-{}", std::process::id()));
        std::fs::write(&dir, "one\n\n  \ntwo  \n").unwrap();
        let lines = load_script(&dir).unwrap();
        let _ = std::fs::remove_file(&dir);
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }
}
