#[cfg(test)]
mod test {
    use anyhow::Result;

    use crate::arch::{InstructionCode, VmInstruction, VmRegister};
    use crate::cil::{CilInstruction, LocalIndex, StackType};
    use crate::recompiler::{
        CompareTranslator, OpCodeTranslator, PopTranslator, PushTranslator, SimpleOpCodeTranslator, StrategyKind,
        TranslateError, TranslationContext,
    };

    fn push_dword(ctx: &mut TranslationContext, value: u32) -> Result<()> {
        PushTranslator::new().translate(&VmInstruction::dword(0, InstructionCode::PushiDword, value), ctx)?;
        Ok(())
    }

    #[test]
    fn push_immediates_become_constants() -> Result<()> {
        let push = PushTranslator::new();
        let mut ctx = TranslationContext::default();

        let dword = push.translate(&VmInstruction::dword(0, InstructionCode::PushiDword, 0xffff_fffe), &mut ctx)?;
        assert_eq!(dword, vec![CilInstruction::LdcI4(-2)]);

        let qword = push.translate(&VmInstruction::qword(5, InstructionCode::PushiQword, 1 << 40), &mut ctx)?;
        assert_eq!(qword, vec![CilInstruction::LdcI8(1 << 40)]);

        assert_eq!(ctx.stack(), &[StackType::Int32, StackType::Int64]);
        Ok(())
    }

    #[test]
    fn push_register_narrows_by_width() -> Result<()> {
        let push = PushTranslator::new();
        let mut ctx = TranslationContext::default();

        let byte = push.translate(&VmInstruction::register(0, InstructionCode::PushrByte, VmRegister::R0), &mut ctx)?;
        assert_eq!(byte, vec![CilInstruction::Ldloc(LocalIndex(0)), CilInstruction::ConvU1]);

        let word = push.translate(&VmInstruction::register(2, InstructionCode::PushrWord, VmRegister::R0), &mut ctx)?;
        assert_eq!(word, vec![CilInstruction::Ldloc(LocalIndex(0)), CilInstruction::ConvU2]);

        let dword = push.translate(&VmInstruction::register(4, InstructionCode::PushrDword, VmRegister::R0), &mut ctx)?;
        assert_eq!(dword, vec![CilInstruction::Ldloc(LocalIndex(0)), CilInstruction::ConvU4]);

        let qword = push.translate(&VmInstruction::register(6, InstructionCode::PushrQword, VmRegister::R0), &mut ctx)?;
        assert_eq!(qword, vec![CilInstruction::Ldloc(LocalIndex(0))]);

        assert_eq!(
            ctx.stack(),
            &[StackType::Int32, StackType::Int32, StackType::Int32, StackType::Int64]
        );
        assert_eq!(ctx.locals().len(), 1);
        Ok(())
    }

    #[test]
    fn push_object_register_uses_separate_local() -> Result<()> {
        let push = PushTranslator::new();
        let mut ctx = TranslationContext::default();

        push.translate(&VmInstruction::register(0, InstructionCode::PushrQword, VmRegister::R1), &mut ctx)?;
        let object = push.translate(&VmInstruction::register(2, InstructionCode::PushrObject, VmRegister::R1), &mut ctx)?;

        assert_eq!(object, vec![CilInstruction::Ldloc(LocalIndex(1))]);
        assert_eq!(ctx.stack(), &[StackType::Int64, StackType::Object]);
        assert_eq!(ctx.locals()[1].ty, StackType::Object);
        Ok(())
    }

    #[test]
    fn push_rejects_mismatched_operand() {
        let push = PushTranslator::new();
        let mut ctx = TranslationContext::default();

        let err = push
            .translate(&VmInstruction::qword(0, InstructionCode::PushiDword, 1), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TranslateError::ContractViolation { .. }));

        let err = push
            .translate(&VmInstruction::bare(0, InstructionCode::PushrDword), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TranslateError::ContractViolation { .. }));
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn translator_rejects_foreign_code() {
        let mut ctx = TranslationContext::default();
        let err = PushTranslator::new()
            .translate(&VmInstruction::bare(0, InstructionCode::AddDword), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "contract violation in opcode ADD_DWORD: got operand 'ADD_DWORD', expected one of the codes handled by the push translator"
        );
    }

    #[test]
    fn pop_discards_or_stores() -> Result<()> {
        let pop = PopTranslator::new();
        let mut ctx = TranslationContext::default();
        push_dword(&mut ctx, 1)?;
        push_dword(&mut ctx, 2)?;

        let discarded = pop.translate(&VmInstruction::bare(0, InstructionCode::Pop), &mut ctx)?;
        assert_eq!(discarded, vec![CilInstruction::Pop]);
        assert_eq!(ctx.depth(), 1);

        let stored = pop.translate(&VmInstruction::register(1, InstructionCode::Pop, VmRegister::R3), &mut ctx)?;
        assert_eq!(stored, vec![CilInstruction::ConvU8, CilInstruction::Stloc(LocalIndex(0))]);
        assert_eq!(ctx.depth(), 0);
        assert_eq!(ctx.locals()[0].ty, StackType::Int64);
        Ok(())
    }

    #[test]
    fn pop_on_empty_stack_underflows() {
        let mut ctx = TranslationContext::default();
        let err = PopTranslator::new()
            .translate(&VmInstruction::bare(0, InstructionCode::Pop), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err,
            TranslateError::StackUnderflow {
                code: InstructionCode::Pop.into(),
                needed: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn simple_translator_pops_operands_and_pushes_result() -> Result<()> {
        let codes = [InstructionCode::AddDword, InstructionCode::AddQword];
        let add = SimpleOpCodeTranslator::new("add", CilInstruction::Add, &codes)?;
        assert_eq!(add.kind(), StrategyKind::SimpleArithmetic);
        assert_eq!(add.operand_count(), 2);

        let mut ctx = TranslationContext::default();
        push_dword(&mut ctx, 1)?;
        push_dword(&mut ctx, 2)?;
        let out = add.translate(&VmInstruction::bare(0, InstructionCode::AddDword), &mut ctx)?;
        assert_eq!(out, vec![CilInstruction::Add]);
        assert_eq!(ctx.stack(), &[StackType::Int32]);
        Ok(())
    }

    #[test]
    fn nor_emits_or_then_not() -> Result<()> {
        let codes = [InstructionCode::NorDword, InstructionCode::NorQword];
        let nor =
            SimpleOpCodeTranslator::with_sequence("nor", vec![CilInstruction::Or, CilInstruction::Not], &codes)?;
        assert_eq!(nor.operand_count(), 2);

        let mut ctx = TranslationContext::default();
        push_dword(&mut ctx, 0xf0)?;
        push_dword(&mut ctx, 0x0f)?;
        let out = nor.translate(&VmInstruction::bare(0, InstructionCode::NorDword), &mut ctx)?;
        assert_eq!(out, vec![CilInstruction::Or, CilInstruction::Not]);
        assert_eq!(ctx.stack(), &[StackType::Int32]);
        Ok(())
    }

    #[test]
    fn simple_translator_checks_operand_count_up_front() -> Result<()> {
        let nor = SimpleOpCodeTranslator::with_sequence(
            "nor",
            vec![CilInstruction::Or, CilInstruction::Not],
            &[InstructionCode::NorDword],
        )?;
        let mut ctx = TranslationContext::default();
        push_dword(&mut ctx, 1)?;
        let err = nor
            .translate(&VmInstruction::bare(0, InstructionCode::NorDword), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err,
            TranslateError::StackUnderflow {
                code: InstructionCode::NorDword.into(),
                needed: 2,
                available: 1,
            }
        );
        assert!(ctx.take_emitted().is_empty());
        Ok(())
    }

    #[test]
    fn compare_produces_sign_sequence() -> Result<()> {
        let cmp = CompareTranslator::new();
        let mut ctx = TranslationContext::default();
        push_dword(&mut ctx, 3)?;
        push_dword(&mut ctx, 7)?;

        let out = cmp.translate(&VmInstruction::bare(0, InstructionCode::CmpDword), &mut ctx)?;
        let (a, b) = (LocalIndex(0), LocalIndex(1));
        assert_eq!(
            out,
            vec![
                CilInstruction::Stloc(b),
                CilInstruction::Stloc(a),
                CilInstruction::Ldloc(a),
                CilInstruction::Ldloc(b),
                CilInstruction::Cgt,
                CilInstruction::Ldloc(a),
                CilInstruction::Ldloc(b),
                CilInstruction::Clt,
                CilInstruction::Sub,
            ]
        );
        assert_eq!(ctx.stack(), &[StackType::Int32]);
        assert!(ctx.locals().iter().all(|local| local.ty == StackType::Int32));
        Ok(())
    }

    #[test]
    fn compare_shape_is_identical_for_integer_and_float() -> Result<()> {
        let cmp = CompareTranslator::new();

        let mut int_ctx = TranslationContext::default();
        int_ctx.push(InstructionCode::CmpQword, StackType::Int64)?;
        int_ctx.push(InstructionCode::CmpQword, StackType::Int64)?;
        let int_out = cmp.translate(&VmInstruction::bare(0, InstructionCode::CmpQword), &mut int_ctx)?;

        let mut float_ctx = TranslationContext::default();
        float_ctx.push(InstructionCode::CmpR64, StackType::Float)?;
        float_ctx.push(InstructionCode::CmpR64, StackType::Float)?;
        let float_out = cmp.translate(&VmInstruction::bare(0, InstructionCode::CmpR64), &mut float_ctx)?;

        let mnemonics = |out: &[CilInstruction]| out.iter().map(|insn| insn.mnemonic()).collect::<Vec<_>>();
        assert_eq!(mnemonics(&int_out), mnemonics(&float_out));
        assert_eq!(float_ctx.locals()[0].ty, StackType::Float);
        assert_eq!(float_ctx.stack(), &[StackType::Int32]);
        Ok(())
    }

    #[test]
    fn generic_compare_on_references() -> Result<()> {
        let cmp = CompareTranslator::new();
        let mut ctx = TranslationContext::default();
        ctx.push(InstructionCode::Cmp, StackType::Object)?;
        ctx.push(InstructionCode::Cmp, StackType::Object)?;

        let out = cmp.translate(&VmInstruction::bare(0, InstructionCode::Cmp), &mut ctx)?;
        assert_eq!(
            out,
            vec![CilInstruction::Ceq, CilInstruction::LdcI4(1), CilInstruction::Xor]
        );
        assert_eq!(ctx.stack(), &[StackType::Int32]);
        assert!(ctx.locals().is_empty());
        Ok(())
    }

    #[test]
    fn typed_compare_rejects_references() -> Result<()> {
        let mut ctx = TranslationContext::default();
        ctx.push(InstructionCode::CmpR32, StackType::Object)?;
        ctx.push(InstructionCode::CmpR32, StackType::Float)?;
        let err = CompareTranslator::new()
            .translate(&VmInstruction::bare(0, InstructionCode::CmpR32), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TranslateError::ContractViolation { .. }));
        Ok(())
    }

    #[test]
    fn simple_translator_rejects_bad_sequences() {
        let codes = [InstructionCode::AddDword];
        let err = SimpleOpCodeTranslator::with_sequence("dup", vec![CilInstruction::Dup], &codes).unwrap_err();
        assert_eq!(
            err.to_string(),
            "translator 'dup' host sequence leaves 2 values, expected exactly one"
        );

        let err = SimpleOpCodeTranslator::with_sequence("drop", vec![CilInstruction::Pop], &codes).unwrap_err();
        assert!(err.to_string().contains("leaves 0 values"));

        let err = SimpleOpCodeTranslator::with_sequence("empty", Vec::new(), &codes).unwrap_err();
        assert_eq!(err.to_string(), "translator 'empty' has an empty host sequence");
    }

    #[test]
    fn float_survives_a_round_trip_through_a_register() -> Result<()> {
        let add = SimpleOpCodeTranslator::new("add", CilInstruction::Add, &[InstructionCode::AddR64])?;
        let mut ctx = TranslationContext::default();
        ctx.push(InstructionCode::AddR64, StackType::Float)?;
        ctx.push(InstructionCode::AddR64, StackType::Float)?;
        add.translate(&VmInstruction::bare(0, InstructionCode::AddR64), &mut ctx)?;

        let stored = PopTranslator::new()
            .translate(&VmInstruction::register(1, InstructionCode::Pop, VmRegister::R0), &mut ctx)?;
        assert_eq!(stored, vec![CilInstruction::Stloc(LocalIndex(0))]);
        assert_eq!(ctx.locals()[0].ty, StackType::Float);

        let loaded = PushTranslator::new().translate(
            &VmInstruction::register(3, InstructionCode::PushrQword, VmRegister::R0),
            &mut ctx,
        )?;
        assert_eq!(loaded, vec![CilInstruction::Ldloc(LocalIndex(0))]);
        assert_eq!(ctx.stack(), &[StackType::Float]);

        let err = PushTranslator::new()
            .translate(&VmInstruction::register(5, InstructionCode::PushrByte, VmRegister::R0), &mut ctx)
            .unwrap_err();
        assert!(matches!(err, TranslateError::ContractViolation { .. }));

        // An integral store switches the register back to its int64 local.
        push_dword(&mut ctx, 4)?;
        PopTranslator::new().translate(&VmInstruction::register(7, InstructionCode::Pop, VmRegister::R0), &mut ctx)?;
        let loaded = PushTranslator::new().translate(
            &VmInstruction::register(9, InstructionCode::PushrQword, VmRegister::R0),
            &mut ctx,
        )?;
        assert_eq!(loaded, vec![CilInstruction::Ldloc(LocalIndex(1))]);
        assert_eq!(ctx.stack(), &[StackType::Float, StackType::Int64]);
        Ok(())
    }

    #[test]
    fn generic_compare_rejects_reference_against_number() -> Result<()> {
        let mut ctx = TranslationContext::default();
        ctx.push(InstructionCode::Cmp, StackType::Object)?;
        ctx.push(InstructionCode::Cmp, StackType::Int32)?;
        let err = CompareTranslator::new()
            .translate(&VmInstruction::bare(0, InstructionCode::Cmp), &mut ctx)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "contract violation in opcode CMP: got operand 'O and int32', expected two references or two numeric operands"
        );
        assert!(ctx.take_emitted().is_empty());
        assert_eq!(ctx.depth(), 2);
        Ok(())
    }
}
