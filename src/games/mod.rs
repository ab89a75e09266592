pub mod daifugo;
