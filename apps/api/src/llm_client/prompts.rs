// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting instructions.

/// Instruction fragment that enforces a single bare JSON object as the reply.
pub const JSON_ONLY_INSTRUCTION: &str = "只输出一个合法的 JSON 对象。\
    不要在 JSON 之外输出任何文字，不要使用 markdown 代码块，不要解释或道歉。";

/// Instruction fragment that forbids values outside the enumerated vocabulary.
pub const CLOSED_VOCABULARY_INSTRUCTION: &str = "只能使用标签池中列出的原样名称，\
    不得自创、翻译、缩写或改写标签。无法确定的标签一律输出 null。";
