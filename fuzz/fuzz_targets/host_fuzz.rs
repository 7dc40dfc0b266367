#![no_main]
use libfuzzer_sys::fuzz_target;
use oxibr::DecodeHost;

// Interpret the input as a script of host calls with arbitrary offsets and
// lengths. Out-of-range or out-of-order calls must be rejected cleanly.
fuzz_target!(|data: &[u8]| {
    let mut host = DecodeHost::new();
    let mut ids = Vec::new();
    let mut ops = data.chunks_exact(3);
    for op in &mut ops {
        let (a, b) = (usize::from(op[1]), usize::from(op[2]));
        match op[0] % 7 {
            0 => {
                let _ = host.alloc_input(a);
            }
            1 => {
                let _ = host.alloc_output(b);
            }
            2 => ids.push(host.create_session()),
            3 => {
                let _ = host.stage_input(&data[..a.min(data.len())]);
            }
            4 => {
                if let Some(&id) = ids.get(a % ids.len().max(1)) {
                    let _ = host.step(id, a, b);
                }
            }
            5 => {
                if let Some(&id) = ids.get(a % ids.len().max(1)) {
                    let _ = host.destroy(id);
                    let _ = host.has_more_output(id);
                }
            }
            _ => {
                let _ = host.drain_output();
            }
        }
    }
});
