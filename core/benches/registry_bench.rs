use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use unvirt_core::arch::{DecodedInstruction, InstructionCode, VmInstruction, VmRegister};
use unvirt_core::recompiler::{MethodRecompiler, TranslatorRegistry};

fn arithmetic_body(len: u32) -> Vec<DecodedInstruction> {
    let mut body = Vec::with_capacity(len as usize * 4);
    let mut offset = 0u64;
    for i in 0..len {
        body.push(VmInstruction::register(offset, InstructionCode::PushrDword, VmRegister::R0).into());
        body.push(VmInstruction::dword(offset + 2, InstructionCode::PushiDword, i).into());
        body.push(VmInstruction::bare(offset + 7, InstructionCode::AddDword).into());
        body.push(VmInstruction::register(offset + 8, InstructionCode::Pop, VmRegister::R0).into());
        offset += 10;
    }
    body
}

fn bench_lookup(c: &mut Criterion) {
    let registry = TranslatorRegistry::build().unwrap();
    c.bench_function("registry_lookup_all_opcodes", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for &code in InstructionCode::ALL {
                if registry.lookup_opcode(black_box(code)).is_ok() {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

fn bench_recompile(c: &mut Criterion) {
    let registry = TranslatorRegistry::build().unwrap();
    let recompiler = MethodRecompiler::new(&registry);
    let body = arithmetic_body(256);
    c.bench_function("recompile_arithmetic_1024", |b| {
        b.iter(|| black_box(recompiler.recompile(black_box(&body)).unwrap()))
    });

    let bodies: Vec<Vec<DecodedInstruction>> = (0..32).map(|_| arithmetic_body(64)).collect();
    let slices: Vec<&[DecodedInstruction]> = bodies.iter().map(Vec::as_slice).collect();
    c.bench_function("recompile_all_32_methods", |b| {
        b.iter(|| black_box(recompiler.recompile_all(black_box(&slices))))
    });
}

criterion_group!(benches, bench_lookup, bench_recompile);
criterion_main!(benches);
