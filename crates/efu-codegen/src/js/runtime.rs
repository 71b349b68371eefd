//! The fixed runtime prelude attached to every emitted JS program.
//!
//! Supplies the three global builtins as generators and the `exec` driver:
//!
//! - `printf` walks the format string, substituting each `%v` with the next
//!   positional argument, and accumulates into a persistent buffer; every
//!   complete line (up to a newline) is flushed to the output device, the
//!   remainder stays buffered for the next call.
//! - `printnf` is `printf` with a newline appended to the format.
//! - `fmt` returns the formatted string instead of printing.
//! - `exec` steps the top-level generator, awaiting any yielded promise and
//!   feeding the resolved value back in, until completion.

/// The prelude text, emitted verbatim at the top of every JS module.
pub const RUNTIME: &str = r#"let __buffer = "";

function __format(fmt, args) {
  let out = "";
  let next = 0;
  for (let i = 0; i < fmt.length; i++) {
    if (fmt[i] === "%" && fmt[i + 1] === "v") {
      out += String(args[next]);
      next += 1;
      i += 1;
    } else {
      out += fmt[i];
    }
  }
  return out;
}

function* printf(fmt, ...args) {
  __buffer += __format(fmt, args);
  let newline = __buffer.indexOf("\n");
  while (newline >= 0) {
    console.log(__buffer.slice(0, newline));
    __buffer = __buffer.slice(newline + 1);
    newline = __buffer.indexOf("\n");
  }
}

function* printnf(fmt, ...args) {
  yield* printf(fmt + "\n", ...args);
}

function* fmt(fmt, ...args) {
  return __format(fmt, args);
}

async function exec(fn) {
  const gen = fn();
  let input = undefined;
  while (true) {
    const { value, done } = gen.next(input);
    if (done) {
      return value;
    }
    input = value && typeof value.then === "function" ? await value : value;
  }
}
"#;
